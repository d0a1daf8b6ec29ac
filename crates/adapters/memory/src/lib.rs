//! tmii-adapter-memory - 内存数据适配器
//!
//! 演示模式与测试使用的 `ResourceService` 实现：
//! - 搜索：按资源声明的文本字段做大小写不敏感子串匹配
//! - 排序：按类型化排序键比较，空值无论方向总是排在最后
//! - 分页：`(page-1)*itemPerPage .. page*itemPerPage`

mod query;
mod record;
mod seed;
mod store;

pub use query::apply_query;
pub use record::MockRecord;
pub use seed::{seed_members, seed_transactions, seed_users};
pub use store::{InMemoryResourceStore, MockLatency};
