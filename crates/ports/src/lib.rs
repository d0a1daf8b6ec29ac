//! ports - 抽象 trait 层
//!
//! 定义控制器依赖的所有外部能力接口

mod notifier;
mod resource_service;
mod settings;
mod token;

pub use notifier::*;
pub use resource_service::*;
pub use settings::*;
pub use token::*;
