//! 面向界面的成功 / 失败提示

use std::sync::Arc;

use tmii_errors::ApiError;
use tmii_ports::{Notifier, TracingNotifier};
use tracing::{debug, warn};

/// 鉴权失败时的恢复回调（如跳转登录）
pub type AuthErrorCallback = Arc<dyn Fn(&ApiError) + Send + Sync>;

/// 决定一个结果是否、以何种方式展示给用户
pub struct UiFeedback {
    notifier: Arc<dyn Notifier>,
    on_auth_error: Option<AuthErrorCallback>,
}

impl Default for UiFeedback {
    fn default() -> Self {
        Self::new(Arc::new(TracingNotifier))
    }
}

impl UiFeedback {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            on_auth_error: None,
        }
    }

    pub fn with_auth_callback(mut self, callback: impl Fn(&ApiError) + Send + Sync + 'static) -> Self {
        self.on_auth_error = Some(Arc::new(callback));
        self
    }

    /// 查询失败：401 / 403 不提示
    pub fn on_query_error(&self, err: &ApiError) {
        if err.is_auth_error() || err.is_cancelled() {
            debug!(code = err.code, "Query error not surfaced");
            return;
        }
        self.notifier.error(&err.message);
    }

    /// 变更失败
    pub fn on_mutation_error(&self, err: &ApiError) {
        if err.is_validation_error() {
            warn!(code = err.code, details = ?err.details, error = %err.message, "Validation error");
            return;
        }
        if err.is_auth_error() {
            if let Some(callback) = &self.on_auth_error {
                callback(err);
            }
            return;
        }
        self.notifier.error(&err.message);
    }

    /// 变更成功，展示服务端返回的信息
    pub fn on_mutation_success(&self, message: &str) {
        if !message.is_empty() {
            self.notifier.success(message);
        }
    }
}
