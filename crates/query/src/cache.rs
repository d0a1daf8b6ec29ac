//! 分页结果缓存

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tmii_common::{PageResult, QueryParams};
use tmii_domain_core::{EntityKind, Resource};
use tokio::time::Instant;

/// 缓存 key：资源类型 + 完整查询参数
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: EntityKind,
    pub params: QueryParams,
}

impl QueryKey {
    pub fn new(kind: EntityKind, params: QueryParams) -> Self {
        Self { kind, params }
    }

    /// 是否为某资源的默认首页（不区分排序和搜索）
    pub fn is_first_page_of(&self, kind: EntityKind, item_per_page: u32) -> bool {
        self.kind == kind && self.params.page == 1 && self.params.item_per_page == item_per_page
    }
}

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry<R> {
    pub data: Arc<PageResult<R>>,
    pub fetched_at: Instant,
    /// 被显式失效
    pub invalidated: bool,
}

impl<R> CacheEntry<R> {
    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.invalidated || self.fetched_at.elapsed() >= stale_time
    }
}

/// 查询缓存
///
/// 空闲超过 `gc_time` 的条目被 moka 回收；失效只打标记，旧数据仍可作为占位展示。
pub struct QueryCache<R: Resource> {
    entries: Cache<QueryKey, CacheEntry<R>>,
}

impl<R: Resource> QueryCache<R> {
    const MAX_ENTRIES: u64 = 1_000;

    pub fn new(gc_time: Duration) -> Self {
        let entries = Cache::builder()
            .max_capacity(Self::MAX_ENTRIES)
            .time_to_idle(gc_time)
            .build();
        Self { entries }
    }

    pub async fn get(&self, key: &QueryKey) -> Option<CacheEntry<R>> {
        self.entries.get(key).await
    }

    pub async fn insert(&self, key: QueryKey, data: Arc<PageResult<R>>) {
        let entry = CacheEntry {
            data,
            fetched_at: Instant::now(),
            invalidated: false,
        };
        self.entries.insert(key, entry).await;
    }

    /// 将满足条件的条目标记为失效，返回数量
    pub async fn invalidate_where<P>(&self, predicate: P) -> u64
    where
        P: Fn(&QueryKey) -> bool,
    {
        let matched: Vec<(QueryKey, CacheEntry<R>)> = self
            .entries
            .iter()
            .filter(|(key, entry)| !entry.invalidated && predicate(&**key))
            .map(|(key, entry)| ((*key).clone(), entry))
            .collect();

        let count = matched.len() as u64;
        for (key, mut entry) in matched {
            entry.invalidated = true;
            self.entries.insert(key, entry).await;
        }
        count
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}
