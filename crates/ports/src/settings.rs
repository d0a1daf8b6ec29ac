//! 界面设置持久化

use tmii_errors::AppResult;

/// 设置文档的存取
///
/// 存取的是整份序列化文档，格式由调用方决定。
pub trait SettingsStore: Send + Sync {
    /// 尚未保存过时返回 None
    fn read(&self) -> AppResult<Option<String>>;

    fn write(&self, document: &str) -> AppResult<()>;
}
