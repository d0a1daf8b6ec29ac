//! Authenticated transport

use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use serde::de::DeserializeOwned;
use tmii_common::ApiResponse;
use tmii_errors::{ApiError, AppResult};
use tmii_ports::{TokenProvider, TokenRefresher};
use tmii_telemetry::TRANSPORT_REQUESTS_TOTAL;
use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::normalize_error;
use crate::executor::RequestExecutor;
use crate::refresh::RefreshCoordinator;
use crate::request::{ApiRequest, RawResponse};

/// HTTP transport with bearer injection and refresh-then-replay on 401
pub struct HttpTransport {
    executor: Arc<dyn RequestExecutor>,
    tokens: Arc<dyn TokenProvider>,
    refresh: Option<RefreshCoordinator>,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        tokens: Arc<dyn TokenProvider>,
        config: TransportConfig,
    ) -> Self {
        Self {
            executor,
            tokens,
            refresh: None,
            config,
        }
    }

    /// Without a refresher a 401 is returned to the caller as is
    pub fn with_refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresh = Some(RefreshCoordinator::new(refresher));
        self
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh
            .as_ref()
            .is_some_and(RefreshCoordinator::is_refreshing)
    }

    /// Send a request and decode the response envelope
    ///
    /// An envelope whose `code` is 400 or above is an error even when the
    /// HTTP status was 2xx.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> AppResult<ApiResponse<T>> {
        let response = self.dispatch(&request).await?;

        if response.is_unauthorized() && self.may_refresh(&request) {
            if let Some(refresh) = &self.refresh {
                refresh.refresh().await?;
                let replay = request.into_retried();
                let response = self.dispatch(&replay).await?;
                return self.decode(response);
            }
        }

        self.decode(response)
    }

    fn may_refresh(&self, request: &ApiRequest) -> bool {
        !request.retried && self.refresh.is_some() && !self.config.is_auth_exempt(&request.path)
    }

    async fn dispatch(&self, request: &ApiRequest) -> AppResult<RawResponse> {
        let token = self.tokens.access_token();
        let started = Instant::now();
        let method = request.method.to_string();

        match self.executor.execute(request, token.as_deref()).await {
            Ok(response) => {
                counter!(
                    TRANSPORT_REQUESTS_TOTAL,
                    "method" => method.clone(),
                    "status" => response.status.to_string()
                )
                .increment(1);
                if !self.config.production {
                    debug!(
                        method = %method,
                        url = %request.path,
                        status = response.status,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        retried = request.retried,
                        "HTTP request completed"
                    );
                }
                Ok(response)
            }
            Err(e) => {
                counter!(
                    TRANSPORT_REQUESTS_TOTAL,
                    "method" => method.clone(),
                    "status" => "network_error"
                )
                .increment(1);
                warn!(method = %method, url = %request.path, error = %e, "HTTP request failed");
                Err(ApiError::unexpected(e, self.config.production))
            }
        }
    }

    fn decode<T: DeserializeOwned>(&self, response: RawResponse) -> AppResult<ApiResponse<T>> {
        if response.status >= 400 {
            return Err(normalize_error(&response));
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&response.body).map_err(|e| {
            ApiError::unexpected(format!("Malformed response body: {}", e), self.config.production)
        })?;
        envelope.into_result()
    }
}
