//! 内存 ResourceService

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tmii_common::{AckResponse, ApiResponse, PageResult, QueryParams};
use tmii_errors::{ApiError, AppResult};
use tmii_ports::ResourceService;
use tokio::sync::RwLock;
use tracing::debug;

use crate::query::apply_query;
use crate::record::MockRecord;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 模拟网络延迟
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockLatency {
    pub fetch: Duration,
    pub mutation: Duration,
}

impl MockLatency {
    pub fn new(fetch: Duration, mutation: Duration) -> Self {
        Self { fetch, mutation }
    }

    async fn wait(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// 内存存储
///
/// 新记录插入到最前面；`reset` 恢复初始数据。
pub struct InMemoryResourceStore<R: MockRecord> {
    records: RwLock<Vec<R>>,
    seed: Vec<R>,
    latency: MockLatency,
}

impl<R: MockRecord> InMemoryResourceStore<R> {
    pub fn new(seed: Vec<R>) -> Self {
        Self {
            records: RwLock::new(seed.clone()),
            seed,
            latency: MockLatency::default(),
        }
    }

    pub fn with_latency(mut self, latency: MockLatency) -> Self {
        self.latency = latency;
        self
    }

    /// 当前全部记录
    pub async fn snapshot(&self) -> Vec<R> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// 恢复初始数据
    pub async fn reset(&self) {
        let mut records = self.records.write().await;
        *records = self.seed.clone();
        debug!(kind = %R::KIND, "Mock store reset");
    }

    fn generate_id() -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..9)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("{}{}", R::ID_PREFIX, suffix)
    }

    fn not_found() -> ApiError {
        ApiError::not_found(format!("{} not found", R::LABEL))
    }
}

#[async_trait]
impl<R: MockRecord> ResourceService<R> for InMemoryResourceStore<R> {
    async fn fetch_page(&self, params: &QueryParams) -> AppResult<PageResult<R>> {
        MockLatency::wait(self.latency.fetch).await;

        let records = self.records.read().await;
        let page = apply_query(&records, params)?;
        debug!(
            kind = %R::KIND,
            page = params.page,
            count = page.count,
            "Mock page served"
        );
        Ok(page)
    }

    async fn create(&self, payload: &R::Create) -> AppResult<ApiResponse<R>> {
        MockLatency::wait(self.latency.mutation).await;

        let id = Self::generate_id();
        let mut records = self.records.write().await;
        if let Some(message) = records.iter().find_map(|r| r.conflicts_with(payload)) {
            return Err(ApiError::bad_request(message));
        }

        let record = R::build(id, payload, Utc::now())?;
        records.insert(0, record.clone());
        debug!(kind = %R::KIND, id = record.id(), "Mock record created");

        Ok(ApiResponse::created(
            format!("{} created successfully", R::LABEL),
            record,
        ))
    }

    async fn update(&self, id: &str, payload: &R::Update) -> AppResult<ApiResponse<R>> {
        MockLatency::wait(self.latency.mutation).await;

        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(Self::not_found)?;
        record.apply(payload, Utc::now());

        Ok(ApiResponse::ok(
            format!("{} updated successfully", R::LABEL),
            record.clone(),
        ))
    }

    async fn delete(&self, id: &str) -> AppResult<AckResponse> {
        MockLatency::wait(self.latency.mutation).await;

        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(Self::not_found)?;
        records.remove(index);

        Ok(AckResponse::ack(format!("{} deleted successfully", R::LABEL)))
    }
}
