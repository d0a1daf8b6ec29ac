//! tmii-query - 列表查询控制器
//!
//! 每种资源一个控制器，负责：
//! - 分页 / 排序 / 搜索状态，派生 `QueryParams`
//! - 按 `(kind, params)` 缓存分页结果，同一 key 同时只有一个请求在途
//! - 查询失败按策略有限重试，变更操作从不重试
//! - 变更成功后使默认首页失效并刷新当前查询

mod cache;
mod controller;
mod feedback;
mod state;

pub use cache::{CacheEntry, QueryCache, QueryKey};
pub use controller::{ControllerOptions, ResourceController};
pub use feedback::{AuthErrorCallback, UiFeedback};
pub use state::{QuerySnapshot, QueryState, QueryStatus};
