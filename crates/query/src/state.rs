//! 查询状态与对外快照

use std::sync::Arc;

use tmii_common::{PageResult, QueryParams, SortDirection};
use tmii_domain_core::EntityKind;
use tmii_errors::ApiError;

/// 分页 / 排序 / 搜索状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page: u32,
    pub page_size: u32,
    /// 未选择排序列时为 None
    pub sort: Option<(String, SortDirection)>,
    pub search: String,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            sort: None,
            search: String::new(),
        }
    }

    /// 派生查询参数；未排序时按资源默认列降序
    pub fn to_params(&self, kind: EntityKind) -> QueryParams {
        let (sort_by, direction) = self
            .sort
            .clone()
            .unwrap_or_else(|| (kind.default_sort_field().to_string(), SortDirection::Desc));
        QueryParams {
            page: self.page,
            item_per_page: self.page_size,
            sort_by,
            direction,
            search: self.search.clone(),
        }
    }
}

/// 查询状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

/// 控制器当前对外可见的结果
#[derive(Debug, Clone)]
pub struct QuerySnapshot<R> {
    pub params: QueryParams,
    pub status: QueryStatus,
    /// 加载中时保留上一次的数据
    pub data: Option<Arc<PageResult<R>>>,
    pub error: Option<ApiError>,
    /// 展示的数据来自已过期的缓存
    pub is_stale: bool,
}

impl<R> QuerySnapshot<R> {
    pub fn idle(params: QueryParams) -> Self {
        Self {
            params,
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_stale: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    pub fn items(&self) -> &[R] {
        self.data
            .as_deref()
            .map(|page| page.items.as_slice())
            .unwrap_or_default()
    }

    pub fn count(&self) -> u64 {
        self.data.as_ref().map_or(0, |page| page.count)
    }
}
