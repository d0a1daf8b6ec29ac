//! Request executors

use async_trait::async_trait;
use tracing::info;
use url::Url;

use crate::config::TransportConfig;
use crate::error::ExecutorError;
use crate::request::{ApiRequest, RawResponse};

/// Sends one request and returns whatever the server answered
///
/// Implementations do not interpret status codes.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ExecutorError>;
}

/// reqwest-backed executor
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestExecutor {
    pub fn new(config: &TransportConfig) -> Result<Self, ExecutorError> {
        let base_url = Url::parse(&config.base_url)?;
        let client = reqwest::Client::builder()
            .cookie_store(config.with_credentials)
            .timeout(config.timeout)
            .build()?;

        info!(base_url = %base_url, "HTTP executor ready");
        Ok(Self { client, base_url })
    }

    fn url_for(&self, path: &str) -> Result<Url, ExecutorError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    async fn execute(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<RawResponse, ExecutorError> {
        let url = self.url_for(&request.path)?;
        let mut builder = self.client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_join_onto_base() {
        let executor = ReqwestExecutor::new(&TransportConfig::default()).unwrap();
        assert_eq!(
            executor.url_for("/transaction/").unwrap().as_str(),
            "http://localhost:4200/api/v1/transaction/"
        );
        assert_eq!(
            executor.url_for("internal/members/usr_1").unwrap().as_str(),
            "http://localhost:4200/api/v1/internal/members/usr_1"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = ReqwestExecutor::new(&TransportConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ExecutorError::Build(_)));
    }
}
