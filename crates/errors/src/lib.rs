//! tmii-errors - 统一错误处理
//!
//! 所有远程调用失败都会被归一化为 `ApiError { code, status, message }`，
//! 上层只需根据 `ErrorKind` 决定如何展示或重试。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 422
    Validation,
    /// 401 / 403
    Auth,
    /// 404
    NotFound,
    /// 400，携带业务冲突信息（如邮箱重复）
    Conflict,
    /// >= 500
    Server,
    Other,
}

/// 统一的 API 错误
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} ({code} {status})")]
pub struct ApiError {
    pub code: u16,
    pub status: String,
    pub message: String,
    /// 字段级校验信息，对应响应体中的 `errors`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    pub fn new(code: u16, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            status: status.into(),
            message: message.into(),
            details: BTreeMap::new(),
        }
    }

    pub fn with_details(mut self, details: BTreeMap<String, Vec<String>>) -> Self {
        self.details = details;
        self
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(400, "Bad Request", msg)
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(401, "Unauthorized", msg)
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(403, "Forbidden", msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(404, "Not Found", msg)
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(422, "Unprocessable Entity", msg)
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::new(499, "Client Closed Request", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(500, "Internal Server Error", msg)
    }

    /// 非结构化的底层失败（网络错误、解码错误等）
    ///
    /// 生产环境隐藏原始信息。
    pub fn unexpected(raw: impl std::fmt::Display, production: bool) -> Self {
        let message = if production {
            "Oops! Something went wrong".to_string()
        } else {
            raw.to_string()
        };
        Self::internal(message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.code {
            422 => ErrorKind::Validation,
            401 | 403 => ErrorKind::Auth,
            404 => ErrorKind::NotFound,
            400 => ErrorKind::Conflict,
            c if c >= 500 => ErrorKind::Server,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_validation_error(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    pub fn is_server_error(&self) -> bool {
        self.kind() == ErrorKind::Server
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == 499
    }

    /// 查询失败是否值得重试
    ///
    /// 4xx 不重试，408 / 429 例外；取消不重试。
    pub fn is_retryable(&self) -> bool {
        if self.is_server_error() {
            return true;
        }
        match self.code {
            408 | 429 => true,
            499 => false,
            400..=499 => false,
            _ => true,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("Malformed response body: {}", err))
    }
}

/// Result 类型别名
pub type AppResult<T> = Result<T, ApiError>;
