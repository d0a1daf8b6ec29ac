//! Refresh via the API's refresh endpoint

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tmii_common::ApiResponse;
use tmii_errors::{ApiError, AppResult};
use tmii_ports::TokenRefresher;
use tracing::debug;

use crate::error::normalize_error;
use crate::executor::RequestExecutor;
use crate::request::ApiRequest;
use crate::token::TokenStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
    access_token: Option<String>,
}

/// Posts to the refresh endpoint and stores the returned access token
///
/// Talks to the executor directly, so a failing refresh can never trigger
/// another refresh. The refresh cookie travels with the executor's cookie
/// store.
pub struct EndpointRefresher {
    executor: Arc<dyn RequestExecutor>,
    tokens: Arc<TokenStore>,
    path: String,
    production: bool,
}

impl EndpointRefresher {
    pub fn new(
        executor: Arc<dyn RequestExecutor>,
        tokens: Arc<TokenStore>,
        path: impl Into<String>,
        production: bool,
    ) -> Self {
        Self {
            executor,
            tokens,
            path: path.into(),
            production,
        }
    }
}

#[async_trait]
impl TokenRefresher for EndpointRefresher {
    async fn refresh(&self) -> AppResult<()> {
        let request = ApiRequest::post(self.path.clone());
        let response = self
            .executor
            .execute(&request, None)
            .await
            .map_err(|e| ApiError::unexpected(e, self.production))?;

        if response.status >= 400 {
            return Err(normalize_error(&response));
        }

        let envelope: ApiResponse<RefreshPayload> = serde_json::from_str(&response.body)?;
        // cookie-only sessions answer without a token
        if let Some(token) = envelope.into_result()?.data.and_then(|d| d.access_token) {
            self.tokens.set(token);
            debug!("Stored refreshed access token");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutorError;
    use crate::request::RawResponse;
    use tmii_ports::TokenProvider;

    struct Fixed(RawResponse);

    #[async_trait]
    impl RequestExecutor for Fixed {
        async fn execute(
            &self,
            request: &ApiRequest,
            bearer: Option<&str>,
        ) -> Result<RawResponse, ExecutorError> {
            assert_eq!(request.path, "auth/refresh-token");
            assert!(bearer.is_none());
            Ok(self.0.clone())
        }
    }

    fn refresher(response: RawResponse, tokens: Arc<TokenStore>) -> EndpointRefresher {
        EndpointRefresher::new(Arc::new(Fixed(response)), tokens, "auth/refresh-token", false)
    }

    #[tokio::test]
    async fn test_returned_token_is_stored() {
        let tokens = Arc::new(TokenStore::default());
        let body = r#"{"code":200,"status":"OK","message":"Refreshed","data":{"accessToken":"new"}}"#;

        refresher(RawResponse::new(200, body), tokens.clone())
            .refresh()
            .await
            .unwrap();

        assert_eq!(tokens.access_token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_rejected_refresh_keeps_old_token() {
        let tokens = Arc::new(TokenStore::default());
        tokens.set("old");
        let body = r#"{"code":401,"status":"Unauthorized","message":"Refresh token expired"}"#;

        let err = refresher(RawResponse::new(401, body), tokens.clone())
            .refresh()
            .await
            .unwrap_err();

        assert_eq!(err.message, "Refresh token expired");
        assert_eq!(tokens.access_token().as_deref(), Some("old"));
    }
}
