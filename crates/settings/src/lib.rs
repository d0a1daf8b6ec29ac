//! tmii-settings - 界面设置上下文
//!
//! 主题、侧边栏、全局加载状态。显式创建并传递给各视图，
//! 启动时 `hydrate`，只有主题和侧边栏会被持久化。

mod context;
mod store;

pub use context::{SettingsContext, Theme, UiSettings};
pub use store::{InMemorySettingsStore, JsonFileSettingsStore};
