//! ResourceService trait 定义

use async_trait::async_trait;
use tmii_common::{AckResponse, ApiResponse, PageResult, QueryParams};
use tmii_domain_core::Resource;
use tmii_errors::AppResult;

/// 远程资源能力接口
///
/// 由 HTTP 实现或内存实现提供。失败一律返回 `ApiError`。
#[async_trait]
pub trait ResourceService<R: Resource>: Send + Sync {
    /// 拉取一页数据
    async fn fetch_page(&self, params: &QueryParams) -> AppResult<PageResult<R>>;

    /// 创建
    async fn create(&self, payload: &R::Create) -> AppResult<ApiResponse<R>>;

    /// 更新
    async fn update(&self, id: &str, payload: &R::Update) -> AppResult<ApiResponse<R>>;

    /// 删除
    async fn delete(&self, id: &str) -> AppResult<AckResponse>;
}
