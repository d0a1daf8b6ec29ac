//! 通用类型定义

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tmii_errors::{ApiError, AppResult};

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[display("ASC")]
    Asc,
    #[default]
    #[display("DESC")]
    Desc,
}

/// 列表查询参数
///
/// 由分页 / 排序 / 搜索状态派生，按值传递，同时作为缓存 key 的一部分。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    pub page: u32,
    pub item_per_page: u32,
    pub sort_by: String,
    pub direction: SortDirection,
    pub search: String,
}

impl QueryParams {
    /// 默认首页：降序、无搜索
    pub fn first_page(sort_by: impl Into<String>, item_per_page: u32) -> Self {
        Self {
            page: 1,
            item_per_page,
            sort_by: sort_by.into(),
            direction: SortDirection::Desc,
            search: String::new(),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.item_per_page as usize
    }

    /// 校验 page >= 1 且 itemPerPage > 0
    pub fn validate(&self) -> AppResult<()> {
        if self.page < 1 {
            return Err(ApiError::validation("page must be at least 1"));
        }
        if self.item_per_page == 0 {
            return Err(ApiError::validation("itemPerPage must be greater than 0"));
        }
        Ok(())
    }

    /// 转换为 URL 查询参数
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("itemPerPage", self.item_per_page.to_string()),
            ("sort", self.sort_by.clone()),
            ("direction", self.direction.to_string()),
            ("search", self.search.clone()),
        ]
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub count: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub item_per_page: u32,
    #[serde(default)]
    pub total_pages: u32,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, count: u64, params: &QueryParams) -> Self {
        Self {
            items,
            count,
            page: params.page,
            item_per_page: params.item_per_page,
            total_pages: total_pages(count, params.item_per_page),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// ceil(count / item_per_page)
pub fn total_pages(count: u64, item_per_page: u32) -> u32 {
    if item_per_page == 0 {
        return 0;
    }
    count.div_ceil(item_per_page as u64) as u32
}

/// 可选的每页条数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizeOptions {
    pub choices: Vec<u32>,
    pub default: u32,
}

impl Default for PageSizeOptions {
    fn default() -> Self {
        Self {
            choices: vec![10, 20, 30, 40, 50],
            default: 10,
        }
    }
}

impl PageSizeOptions {
    pub fn new(choices: Vec<u32>, default: u32) -> AppResult<Self> {
        let options = Self { choices, default };
        options.ensure(default)?;
        Ok(options)
    }

    pub fn ensure(&self, size: u32) -> AppResult<()> {
        if size > 0 && self.choices.contains(&size) {
            Ok(())
        } else {
            Err(ApiError::validation(format!(
                "page size {} is not one of {:?}",
                size, self.choices
            )))
        }
    }
}
