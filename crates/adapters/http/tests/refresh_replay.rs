//! 401 handling end to end: refresh once, replay everything queued behind it

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tmii_adapter_http::{
    ApiRequest, ExecutorError, HttpTransport, RawResponse, RemoteResourceService,
    RequestExecutor, TokenStore, TransportConfig,
};
use tmii_common::{ApiResponse, QueryParams};
use tmii_domain_core::Member;
use tmii_errors::{ApiError, AppResult};
use tmii_ports::{ResourceService, TokenRefresher};

const OK_BODY: &str = r#"{"code":200,"status":"OK","message":"ok","data":{"items":[],"count":0}}"#;
const EXPIRED_BODY: &str = r#"{"code":401,"status":"Unauthorized","message":"Token expired"}"#;

/// Accepts only the token "fresh"; answers 401 otherwise
#[derive(Default)]
struct TokenCheckingServer {
    requests: Mutex<Vec<ApiRequest>>,
}

impl TokenCheckingServer {
    fn sent(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl RequestExecutor for TokenCheckingServer {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ExecutorError> {
        self.requests.lock().push(request.clone());
        tokio::time::sleep(Duration::from_millis(5)).await;
        if bearer == Some("fresh") {
            Ok(RawResponse::new(200, OK_BODY))
        } else {
            Ok(RawResponse::new(401, EXPIRED_BODY))
        }
    }
}

struct StubRefresher {
    tokens: Arc<TokenStore>,
    calls: AtomicUsize,
    outcome: Option<ApiError>,
}

#[async_trait]
impl TokenRefresher for StubRefresher {
    async fn refresh(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        match &self.outcome {
            None => {
                self.tokens.set("fresh");
                Ok(())
            }
            Some(err) => Err(err.clone()),
        }
    }
}

struct Harness {
    server: Arc<TokenCheckingServer>,
    refresher: Arc<StubRefresher>,
    transport: Arc<HttpTransport>,
}

fn harness(outcome: Option<ApiError>) -> Harness {
    let server = Arc::new(TokenCheckingServer::default());
    let tokens = Arc::new(TokenStore::default());
    tokens.set("stale");
    let refresher = Arc::new(StubRefresher {
        tokens: tokens.clone(),
        calls: AtomicUsize::new(0),
        outcome,
    });
    let transport = Arc::new(
        HttpTransport::new(server.clone(), tokens, TransportConfig::default())
            .with_refresher(refresher.clone()),
    );
    Harness {
        server,
        refresher,
        transport,
    }
}

async fn get(transport: &HttpTransport, path: &str) -> AppResult<ApiResponse<serde_json::Value>> {
    transport.send(ApiRequest::get(path)).await
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_401s_trigger_one_refresh() {
    let h = harness(None);
    let paths: Vec<String> = (0..6).map(|i| format!("internal/members/usr_{}", i)).collect();

    let results = futures::future::join_all(paths.iter().map(|p| get(&h.transport, p))).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 1);
    assert!(!h.transport.is_refreshing());

    let sent = h.server.sent();
    for path in &paths {
        let attempts: Vec<_> = sent.iter().filter(|r| &r.path == path).collect();
        assert_eq!(attempts.len(), 2, "{} should be sent once and replayed once", path);
        assert!(!attempts[0].retried);
        assert!(attempts[1].retried);
    }
}

#[tokio::test(start_paused = true)]
async fn test_queued_requests_replay_in_arrival_order() {
    let h = harness(None);
    let paths: Vec<String> = (0..5).map(|i| format!("internal/users/usr_{}", i)).collect();

    // staggered so each 401 queues behind the refresh in a known order
    let tasks: Vec<_> = paths
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, path)| {
            let transport = h.transport.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10 * i as u64)).await;
                transport.send::<serde_json::Value>(ApiRequest::get(path)).await
            })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }

    assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 1);
    let replayed: Vec<String> = h
        .server
        .sent()
        .into_iter()
        .filter(|r| r.retried)
        .map(|r| r.path)
        .collect();
    assert_eq!(replayed, paths);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_failure_rejects_every_queued_request() {
    let h = harness(Some(ApiError::unauthorized("Refresh token expired")));

    let results =
        futures::future::join_all((0..4).map(|i| get(&h.transport, ["internal/users", "transaction/"][i % 2])))
            .await;

    assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 1);
    for result in results {
        let err = result.unwrap_err();
        assert_eq!(err.code, 401);
        assert_eq!(err.message, "Refresh token expired");
    }
    assert!(!h.transport.is_refreshing());
    // nothing was replayed
    assert!(h.server.sent().iter().all(|r| !r.retried));

    // a later 401 may refresh again
    let _ = get(&h.transport, "internal/users").await;
    assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_login_and_refresh_endpoints_never_refresh() {
    let h = harness(None);

    for path in ["auth/login", "auth/refresh-token"] {
        let err = h
            .transport
            .send::<serde_json::Value>(ApiRequest::post(path))
            .await
            .unwrap_err();
        assert_eq!(err.code, 401);
    }

    assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.server.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_retried_request_never_refreshes_again() {
    let h = harness(None);
    let mut request = ApiRequest::get("internal/members");
    request.retried = true;

    let err = h
        .transport
        .send::<serde_json::Value>(request)
        .await
        .unwrap_err();

    assert_eq!(err.code, 401);
    assert_eq!(h.refresher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_replay_that_fails_again_surfaces_the_error() {
    let server = Arc::new(TokenCheckingServer::default());
    let tokens = Arc::new(TokenStore::default());
    // refresh "succeeds" without producing a usable token
    let refresher = Arc::new(StubRefresher {
        tokens: Arc::new(TokenStore::default()),
        calls: AtomicUsize::new(0),
        outcome: None,
    });
    let transport = HttpTransport::new(server.clone(), tokens, TransportConfig::default())
        .with_refresher(refresher.clone());

    let err = get(&transport, "internal/members").await.unwrap_err();

    assert_eq!(err.message, "Token expired");
    assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(server.sent().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_remote_service_sends_query_and_fills_page_metadata() {
    let h = harness(None);
    let service: RemoteResourceService<Member> =
        RemoteResourceService::new(h.transport.clone(), "internal/members");
    let params = QueryParams {
        search: "budi".to_string(),
        ..QueryParams::first_page("createdAt", 20)
    };

    let page = service.fetch_page(&params).await.unwrap();

    assert_eq!(page.count, 0);
    assert_eq!(page.item_per_page, 20);
    assert_eq!(page.total_pages, 0);

    let sent = h.server.sent();
    let last = sent.last().unwrap();
    assert_eq!(last.path, "internal/members");
    assert!(last.query.contains(&("itemPerPage".to_string(), "20".to_string())));
    assert!(last.query.contains(&("direction".to_string(), "DESC".to_string())));
    assert!(last.query.contains(&("search".to_string(), "budi".to_string())));
}
