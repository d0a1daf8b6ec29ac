//! 资源 trait 与排序键

use std::cmp::Ordering;
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// 资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[display("members")]
    Member,
    #[display("users")]
    User,
    #[display("transactions")]
    Transaction,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Member, EntityKind::User, EntityKind::Transaction];

    /// 未选择排序列时使用的默认列
    pub fn default_sort_field(&self) -> &'static str {
        match self {
            Self::Member | Self::User => "createdAt",
            Self::Transaction => "date",
        }
    }
}

/// 可比较的排序值
///
/// 同一排序键总是产生同一种变体；`None` 表示空值。
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(i64),
    Timestamp(DateTime<Utc>),
}

impl SortValue<'_> {
    fn rank(&self) -> u8 {
        match self {
            Self::Text(_) => 0,
            Self::Number(_) => 1,
            Self::Timestamp(_) => 2,
        }
    }

    /// 升序比较；文本不区分大小写，原文作为次序依据
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// 排序键：名称 + 类型化访问器
pub struct SortKey<R: 'static> {
    pub name: &'static str,
    pub accessor: fn(&R) -> Option<SortValue<'_>>,
}

impl<R> SortKey<R> {
    pub fn value<'a>(&self, record: &'a R) -> Option<SortValue<'a>> {
        (self.accessor)(record)
    }
}

impl<R> Debug for SortKey<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortKey").field("name", &self.name).finish()
    }
}

/// 仪表盘资源
pub trait Resource:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// 创建请求体
    type Create: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static;
    /// 更新请求体
    type Update: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// 该资源支持的排序键
    fn sort_keys() -> &'static [SortKey<Self>];

    /// 参与搜索的文本字段
    fn search_fields(&self) -> Vec<Option<&str>>;

    fn sort_key(name: &str) -> Option<&'static SortKey<Self>> {
        Self::sort_keys().iter().find(|key| key.name == name)
    }

    /// 大小写不敏感的子串匹配，空搜索匹配全部
    fn matches_search(&self, search: &str) -> bool {
        if search.is_empty() {
            return true;
        }
        let needle = search.to_lowercase();
        self.search_fields()
            .into_iter()
            .any(|field| field.unwrap_or_default().to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_text_compare_is_case_insensitive() {
        assert_eq!(
            SortValue::Text("alice").compare(&SortValue::Text("Bob")),
            Ordering::Less
        );
        assert_eq!(
            SortValue::Text("Alice").compare(&SortValue::Text("alice")),
            Ordering::Less
        );
    }

    #[test]
    fn test_timestamp_compare() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(
            SortValue::Timestamp(early).compare(&SortValue::Timestamp(late)),
            Ordering::Less
        );
    }

    #[test]
    fn test_number_compare() {
        assert_eq!(SortValue::Number(9).compare(&SortValue::Number(10)), Ordering::Less);
    }

    #[test]
    fn test_kind_defaults() {
        assert_eq!(EntityKind::Member.default_sort_field(), "createdAt");
        assert_eq!(EntityKind::Transaction.default_sort_field(), "date");
        assert_eq!(EntityKind::User.to_string(), "users");
    }
}
