//! Single-flight token refresh

use std::sync::Arc;

use metrics::counter;
use parking_lot::Mutex;
use tmii_errors::{ApiError, AppResult};
use tmii_ports::TokenRefresher;
use tmii_telemetry::TRANSPORT_REFRESH_TOTAL;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

type Waiter = oneshot::Sender<AppResult<()>>;

#[derive(Default)]
struct RefreshState {
    is_refreshing: bool,
    /// Only appended to while `is_refreshing` is set
    pending: Vec<Waiter>,
}

/// Runs at most one refresh at a time
///
/// The first caller becomes the leader and runs the refresher. Callers that
/// arrive while it is running wait for the same outcome. Waiters are released
/// in arrival order.
pub struct RefreshCoordinator {
    refresher: Arc<dyn TokenRefresher>,
    state: Mutex<RefreshState>,
}

impl RefreshCoordinator {
    pub fn new(refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            refresher,
            state: Mutex::new(RefreshState::default()),
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().is_refreshing
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Refresh the token, or join the refresh already running
    pub async fn refresh(&self) -> AppResult<()> {
        let waiter = {
            let mut state = self.state.lock();
            if state.is_refreshing {
                let (tx, rx) = oneshot::channel();
                state.pending.push(tx);
                Some(rx)
            } else {
                state.is_refreshing = true;
                None
            }
        };

        if let Some(rx) = waiter {
            debug!("Token refresh in progress, queued");
            return rx
                .await
                .unwrap_or_else(|_| Err(ApiError::unauthorized("Token refresh was abandoned")));
        }

        info!("Refreshing access token");
        let guard = SettleGuard {
            state: &self.state,
            armed: true,
        };
        let result = self.refresher.refresh().await;

        match &result {
            Ok(()) => {
                counter!(TRANSPORT_REFRESH_TOTAL, "outcome" => "success").increment(1);
                info!("Access token refreshed");
            }
            Err(e) => {
                counter!(TRANSPORT_REFRESH_TOTAL, "outcome" => "failure").increment(1);
                warn!(code = e.code, error = %e, "Token refresh failed");
            }
        }
        guard.settle(&result);

        result
    }
}

/// Releases waiters even if the leader is dropped mid-refresh
struct SettleGuard<'a> {
    state: &'a Mutex<RefreshState>,
    armed: bool,
}

impl SettleGuard<'_> {
    fn settle(mut self, result: &AppResult<()>) {
        self.armed = false;
        release(self.state, result);
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            release(
                self.state,
                &Err(ApiError::cancelled("Token refresh was cancelled")),
            );
        }
    }
}

fn release(state: &Mutex<RefreshState>, result: &AppResult<()>) {
    let pending = {
        let mut state = state.lock();
        state.is_refreshing = false;
        std::mem::take(&mut state.pending)
    };
    for waiter in pending {
        let _ = waiter.send(result.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowRefresher {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TokenRefresher for SlowRefresher {
        async fn refresh(&self) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.fail {
                Err(ApiError::unauthorized("Refresh token expired"))
            } else {
                Ok(())
            }
        }
    }

    fn coordinator(fail: bool) -> (Arc<SlowRefresher>, Arc<RefreshCoordinator>) {
        let refresher = Arc::new(SlowRefresher {
            calls: AtomicUsize::new(0),
            fail,
        });
        let coordinator = Arc::new(RefreshCoordinator::new(refresher.clone()));
        (refresher, coordinator)
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_refresh() {
        let (refresher, coordinator) = coordinator(false);

        let results = futures::future::join_all((0..5).map(|_| coordinator.refresh())).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reaches_every_waiter() {
        let (refresher, coordinator) = coordinator(true);

        let results = futures::future::join_all((0..3).map(|_| coordinator.refresh())).await;

        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result.unwrap_err().message, "Refresh token expired");
        }
        assert!(!coordinator.is_refreshing());

        // no lockout: the next caller starts a fresh refresh
        let _ = coordinator.refresh().await;
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_leader_releases_waiters() {
        let (_, coordinator) = coordinator(false);

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(coordinator.is_refreshing());

        let follower = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.refresh().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(coordinator.pending_len(), 1);

        leader.abort();
        let err = follower.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert!(!coordinator.is_refreshing());
    }
}
