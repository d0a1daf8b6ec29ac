//! 访问令牌相关 trait

use async_trait::async_trait;
use tmii_errors::AppResult;

/// 令牌刷新函数
///
/// 传输层在收到 401 时调用，同一时刻最多一个刷新在进行。
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self) -> AppResult<()>;
}

/// 访问令牌来源
pub trait TokenProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}
