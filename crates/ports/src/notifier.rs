//! 用户可见的提示（toast）

use tracing::{error, info};

/// 提示通道
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// 默认实现：写入日志
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "tmii::notify", notification = message, "Notification");
    }

    fn error(&self, message: &str) {
        error!(target: "tmii::notify", notification = message, "Notification");
    }
}
