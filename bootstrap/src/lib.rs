//! tmii-bootstrap - 组装仪表盘
//!
//! 按配置选择远程 API 或内存演示数据，为每种资源创建控制器，并恢复界面设置。

mod dashboard;
mod runtime;

pub use dashboard::*;
pub use runtime::*;
