//! 过滤 / 排序 / 分页

use std::cmp::Ordering;

use tmii_common::{PageResult, QueryParams, SortDirection};
use tmii_domain_core::Resource;
use tmii_errors::{ApiError, AppResult};

/// 在给定记录上执行一次列表查询
///
/// 排序是稳定的：相等的记录保持原有顺序。
pub fn apply_query<R: Resource>(records: &[R], params: &QueryParams) -> AppResult<PageResult<R>> {
    params.validate()?;

    let key = R::sort_key(&params.sort_by).ok_or_else(|| {
        ApiError::validation(format!("Unsupported sort field: {}", params.sort_by))
    })?;

    let mut filtered: Vec<&R> = records
        .iter()
        .filter(|record| record.matches_search(&params.search))
        .collect();

    filtered.sort_by(|a, b| match (key.value(a), key.value(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = x.compare(&y);
            match params.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    });

    let count = filtered.len();
    let start = params.offset().min(count);
    let end = (start + params.item_per_page as usize).min(count);
    let items = filtered[start..end].iter().map(|r| (*r).clone()).collect();

    Ok(PageResult::new(items, count as u64, params))
}
