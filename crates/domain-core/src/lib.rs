//! domain-core - 仪表盘管理的三类资源
//!
//! Member / User / Transaction 以及按资源类型声明的排序键表、搜索字段

mod member;
mod resource;
mod transaction;
mod user;

pub use member::*;
pub use resource::*;
pub use transaction::*;
pub use user::*;
