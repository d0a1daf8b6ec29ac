//! 响应信封
//!
//! 服务端在响应体中自带 `code`，即使 HTTP 状态为 200，`code >= 400` 也视为失败。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tmii_errors::{ApiError, AppResult};

/// `{ code, status, message, data?, errors? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub code: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

/// 不关心 data 的响应（如删除）
pub type AckResponse = ApiResponse<serde_json::Value>;

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_code(200, "OK", message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_code(201, "Created", message, Some(data))
    }

    pub fn with_code(
        code: u16,
        status: impl Into<String>,
        message: impl Into<String>,
        data: Option<T>,
    ) -> Self {
        Self {
            code,
            status: status.into(),
            message: message.into(),
            data,
            errors: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.code >= 400
    }

    /// 信封自带的 code >= 400 时转换为错误
    pub fn into_result(self) -> AppResult<Self> {
        if !self.is_failure() {
            return Ok(self);
        }
        let status = if self.status.is_empty() {
            "Error".to_string()
        } else {
            self.status
        };
        let message = if self.message.is_empty() {
            "Request failed".to_string()
        } else {
            self.message
        };
        Err(ApiError::new(self.code, status, message).with_details(self.errors.unwrap_or_default()))
    }

    /// 取出 data，缺失时视为服务端错误
    pub fn into_data(self) -> AppResult<T> {
        let message = self.message.clone();
        self.into_result()?
            .data
            .ok_or_else(|| ApiError::internal(format!("Response carried no data: {}", message)))
    }
}

impl AckResponse {
    pub fn ack(message: impl Into<String>) -> Self {
        Self::with_code(200, "OK", message, None)
    }
}
