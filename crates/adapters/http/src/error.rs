//! Failure mapping

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;
use tmii_errors::ApiError;

use crate::request::RawResponse;

/// A request that never produced an HTTP response
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    #[error("Invalid request: {0}")]
    Build(String),

    #[error("{0}")]
    Network(String),
}

impl From<url::ParseError> for ExecutorError {
    fn from(err: url::ParseError) -> Self {
        Self::Build(err.to_string())
    }
}

impl From<reqwest::Error> for ExecutorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Build(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Loose view of an error body; every member is optional
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
    errors: Option<BTreeMap<String, Vec<String>>>,
}

/// Convert an HTTP error response into an `ApiError`
///
/// Members of a structured body win over the HTTP status line.
pub fn normalize_error(response: &RawResponse) -> ApiError {
    let status_text = if response.status_text.is_empty() {
        "Error".to_string()
    } else {
        response.status_text.clone()
    };

    let Ok(body) = serde_json::from_str::<ErrorBody>(&response.body) else {
        return ApiError::new(response.status, status_text.clone(), status_text);
    };

    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
    ApiError::new(
        body.code.unwrap_or(response.status),
        non_empty(body.status).unwrap_or_else(|| status_text.clone()),
        non_empty(body.message).unwrap_or(status_text),
    )
    .with_details(body.errors.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, status_text: &str, body: &str) -> RawResponse {
        RawResponse {
            status,
            status_text: status_text.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_structured_body_wins() {
        let err = normalize_error(&response(
            400,
            "Bad Request",
            r#"{"code":422,"status":"Unprocessable Entity","message":"Invalid email","errors":{"email":["must be valid"]}}"#,
        ));
        assert_eq!(err.code, 422);
        assert_eq!(err.status, "Unprocessable Entity");
        assert_eq!(err.message, "Invalid email");
        assert_eq!(err.details["email"], vec!["must be valid".to_string()]);
    }

    #[test]
    fn test_plain_body_falls_back_to_status_line() {
        let err = normalize_error(&response(502, "Bad Gateway", "<html>upstream</html>"));
        assert_eq!(err.code, 502);
        assert_eq!(err.status, "Bad Gateway");
        assert_eq!(err.message, "Bad Gateway");
    }

    #[test]
    fn test_partial_body_fills_gaps() {
        let err = normalize_error(&response(404, "Not Found", r#"{"message":"Member not found"}"#));
        assert_eq!(err.code, 404);
        assert_eq!(err.status, "Not Found");
        assert_eq!(err.message, "Member not found");
    }
}
