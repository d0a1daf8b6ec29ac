//! 资源列表控制器

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use metrics::counter;
use parking_lot::Mutex;
use tmii_common::{
    AckResponse, ApiResponse, PageResult, PageSizeOptions, QueryParams, RetryConfig,
    SortDirection, with_query_retry,
};
use tmii_domain_core::Resource;
use tmii_errors::{ApiError, AppResult};
use tmii_ports::ResourceService;
use tmii_telemetry::{QUERY_FETCH_TOTAL, QUERY_INVALIDATIONS_TOTAL};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{QueryCache, QueryKey};
use crate::feedback::UiFeedback;
use crate::state::{QuerySnapshot, QueryState, QueryStatus};

type FetchResult<R> = AppResult<Arc<PageResult<R>>>;
type InflightMap<R> = Mutex<HashMap<QueryKey, Inflight<R>>>;

/// 控制器配置
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub page_sizes: PageSizeOptions,
    /// 缓存新鲜期
    pub stale_time: Duration,
    /// 空闲回收时间
    pub gc_time: Duration,
    /// 仅用于查询
    pub retry: RetryConfig,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_sizes: PageSizeOptions::default(),
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(300),
            retry: RetryConfig::default(),
        }
    }
}

/// 查询状态和当前这一代请求的取消令牌
struct Control {
    state: QueryState,
    cancel: CancellationToken,
}

/// 单个资源类型的列表控制器
///
/// 状态变更会取消上一次未完成的拉取；被取消的拉取不写缓存，也不更新快照。
pub struct ResourceController<R: Resource> {
    service: Arc<dyn ResourceService<R>>,
    options: ControllerOptions,
    feedback: Arc<UiFeedback>,
    cache: QueryCache<R>,
    inflight: InflightMap<R>,
    next_leader: AtomicU64,
    /// 每次失效加一
    epoch: AtomicU64,
    control: Mutex<Control>,
    view: Mutex<QuerySnapshot<R>>,
}

impl<R: Resource> ResourceController<R> {
    pub fn new(service: Arc<dyn ResourceService<R>>, options: ControllerOptions) -> Self {
        let state = QueryState::new(options.page_sizes.default);
        let params = state.to_params(R::KIND);

        Self {
            service,
            cache: QueryCache::new(options.gc_time),
            feedback: Arc::new(UiFeedback::default()),
            inflight: Mutex::new(HashMap::new()),
            next_leader: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            control: Mutex::new(Control {
                state,
                cancel: CancellationToken::new(),
            }),
            view: Mutex::new(QuerySnapshot::idle(params)),
            options,
        }
    }

    pub fn with_feedback(mut self, feedback: Arc<UiFeedback>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn state(&self) -> QueryState {
        self.control.lock().state.clone()
    }

    /// 当前状态派生的查询参数
    pub fn params(&self) -> QueryParams {
        self.control.lock().state.to_params(R::KIND)
    }

    pub fn snapshot(&self) -> QuerySnapshot<R> {
        self.view.lock().clone()
    }

    pub fn is_fetching(&self) -> bool {
        !self.inflight.lock().is_empty()
    }

    // ---- 状态变更 ----

    /// 返回值表示状态是否真的发生了变化
    pub async fn set_page(&self, page: u32) -> AppResult<bool> {
        if page < 1 {
            return Err(ApiError::validation("page must be at least 1"));
        }
        Ok(self.apply(|state| state.page = page).await)
    }

    /// 切换每页条数，回到第一页
    pub async fn set_page_size(&self, page_size: u32) -> AppResult<bool> {
        self.options.page_sizes.ensure(page_size)?;
        Ok(self
            .apply(|state| {
                state.page_size = page_size;
                state.page = 1;
            })
            .await)
    }

    pub async fn set_sort(&self, field: &str, direction: SortDirection) -> AppResult<bool> {
        if R::sort_key(field).is_none() {
            return Err(ApiError::validation(format!(
                "Unsupported sort field: {}",
                field
            )));
        }
        let sort = Some((field.to_string(), direction));
        Ok(self.apply(move |state| state.sort = sort).await)
    }

    /// 取消排序，回到默认列降序
    pub async fn clear_sort(&self) -> bool {
        self.apply(|state| state.sort = None).await
    }

    /// 修改搜索词，回到第一页
    pub async fn set_search(&self, search: &str) -> bool {
        let search = search.to_string();
        self.apply(move |state| {
            state.search = search;
            state.page = 1;
        })
        .await
    }

    async fn apply<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut QueryState),
    {
        let (params, token) = {
            let mut control = self.control.lock();
            let before = control.state.clone();
            change(&mut control.state);
            if control.state == before {
                return false;
            }
            let token = CancellationToken::new();
            std::mem::replace(&mut control.cancel, token.clone()).cancel();
            (control.state.to_params(R::KIND), token)
        };

        debug!(
            kind = %R::KIND,
            page = params.page,
            item_per_page = params.item_per_page,
            sort = %params.sort_by,
            direction = %params.direction,
            search = %params.search,
            "Query state changed"
        );
        // 拉取结果记录在快照中
        let _ = self.run(params, token).await;
        true
    }

    // ---- 查询 ----

    /// 按当前状态加载；缓存新鲜时直接返回
    pub async fn load(&self) -> AppResult<Arc<PageResult<R>>> {
        let (params, token) = self.current();
        self.run(params, token).await
    }

    /// 忽略缓存重新拉取当前页
    pub async fn refetch(&self) -> AppResult<Arc<PageResult<R>>> {
        let (params, token) = self.current();
        let key = QueryKey::new(R::KIND, params.clone());
        self.cache.invalidate_where(|k| *k == key).await;
        self.run(params, token).await
    }

    fn current(&self) -> (QueryParams, CancellationToken) {
        let control = self.control.lock();
        (control.state.to_params(R::KIND), control.cancel.clone())
    }

    async fn run(&self, params: QueryParams, token: CancellationToken) -> FetchResult<R> {
        let key = QueryKey::new(R::KIND, params.clone());

        let cached = self.cache.get(&key).await;
        if let Some(entry) = &cached {
            if !entry.is_stale(self.options.stale_time) {
                debug!(kind = %R::KIND, page = params.page, "Query cache hit");
                let data = entry.data.clone();
                self.publish(&token, &params, Ok(data.clone()));
                return Ok(data);
            }
        }

        self.begin(&token, &params, cached.map(|entry| entry.data));

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::cancelled("Query superseded by a newer request")),
            result = self.fetch_shared(&key) => result,
        };

        match &result {
            Ok(_) => {}
            Err(e) if e.is_cancelled() => {
                debug!(kind = %R::KIND, page = params.page, "Query cancelled");
            }
            Err(e) => {
                warn!(kind = %R::KIND, page = params.page, code = e.code, error = %e, "Query failed");
                self.feedback.on_query_error(e);
            }
        }
        self.publish(&token, &params, result.clone());

        result
    }

    fn begin(
        &self,
        token: &CancellationToken,
        params: &QueryParams,
        placeholder: Option<Arc<PageResult<R>>>,
    ) {
        if token.is_cancelled() {
            return;
        }
        let mut view = self.view.lock();
        view.params = params.clone();
        view.status = QueryStatus::Loading;
        view.error = None;
        if let Some(data) = placeholder {
            view.data = Some(data);
        }
        view.is_stale = view.data.is_some();
    }

    fn publish(&self, token: &CancellationToken, params: &QueryParams, result: FetchResult<R>) {
        if token.is_cancelled() {
            return;
        }
        let mut view = self.view.lock();
        view.params = params.clone();
        match result {
            Ok(data) => {
                view.status = QueryStatus::Success;
                view.data = Some(data);
                view.error = None;
                view.is_stale = false;
            }
            Err(e) => {
                view.status = QueryStatus::Error;
                view.error = Some(e);
            }
        }
    }

    /// 同一 key 同时只有一个请求在途，其余调用者等待同一结果
    ///
    /// 失效会中止命中的在途请求：领头者和等待者都重新竞争，由新的请求读取变更后的数据。
    async fn fetch_shared(&self, key: &QueryKey) -> FetchResult<R> {
        loop {
            let role = {
                let mut inflight = self.inflight.lock();
                match inflight.get(key) {
                    Some(entry) => Role::Join(entry.sender.subscribe()),
                    None => {
                        let id = self.next_leader.fetch_add(1, Ordering::Relaxed);
                        let abort = CancellationToken::new();
                        let (sender, _) = broadcast::channel(1);
                        inflight.insert(
                            key.clone(),
                            Inflight {
                                id,
                                sender,
                                abort: abort.clone(),
                            },
                        );
                        Role::Lead { id, abort }
                    }
                }
            };

            let (id, abort) = match role {
                Role::Join(mut receiver) => {
                    debug!(kind = %R::KIND, page = key.params.page, "Joining in-flight fetch");
                    match receiver.recv().await {
                        Ok(result) => return result,
                        // 领头的请求被取消或被失效中止，重新竞争
                        Err(_) => continue,
                    }
                }
                Role::Lead { id, abort } => (id, abort),
            };

            let guard = InflightGuard {
                inflight: &self.inflight,
                key,
                id,
                armed: true,
            };
            let epoch = self.epoch.load(Ordering::SeqCst);
            let result = tokio::select! {
                biased;
                _ = abort.cancelled() => None,
                result = self.fetch(&key.params) => Some(result),
            };
            // 在途记录已被失效移除时，结果可能早于变更
            let result = match result {
                Some(result) if guard.is_current() => result,
                _ => {
                    debug!(kind = %R::KIND, page = key.params.page, "In-flight fetch invalidated, refetching");
                    continue;
                }
            };

            if let Ok(data) = &result {
                self.cache.insert(key.clone(), data.clone()).await;
                // 写入前后发生的失效同样作用于这一条
                if self.is_invalidation_target(key) && self.epoch.load(Ordering::SeqCst) != epoch {
                    self.cache.invalidate_where(|k| k == key).await;
                }
            }
            let Some(sender) = guard.finish() else {
                debug!(kind = %R::KIND, page = key.params.page, "In-flight fetch invalidated, refetching");
                continue;
            };
            let _ = sender.send(result.clone());

            return result;
        }
    }

    async fn fetch(&self, params: &QueryParams) -> FetchResult<R> {
        let operation = format!("fetch {}", R::KIND);
        debug!(
            kind = %R::KIND,
            page = params.page,
            item_per_page = params.item_per_page,
            "Fetching page"
        );

        let result = with_query_retry(&self.options.retry, &operation, || {
            self.service.fetch_page(params)
        })
        .await;

        let outcome = if result.is_ok() { "success" } else { "error" };
        counter!(QUERY_FETCH_TOTAL, "kind" => R::KIND.to_string(), "outcome" => outcome).increment(1);

        result.map(Arc::new)
    }

    // ---- 变更 ----

    pub async fn create(&self, payload: &R::Create) -> AppResult<ApiResponse<R>> {
        let result = self.service.create(payload).await;
        self.settle("create", result).await
    }

    pub async fn update(&self, id: &str, payload: &R::Update) -> AppResult<ApiResponse<R>> {
        let result = self.service.update(id, payload).await;
        self.settle("update", result).await
    }

    pub async fn delete(&self, id: &str) -> AppResult<AckResponse> {
        let result = self.service.delete(id).await;
        self.settle("delete", result).await
    }

    /// 变更从不重试；成功后失效默认首页，失败时缓存保持不变
    async fn settle<T>(
        &self,
        action: &'static str,
        result: AppResult<ApiResponse<T>>,
    ) -> AppResult<ApiResponse<T>> {
        match result {
            Ok(response) => {
                info!(kind = %R::KIND, action, code = response.code, "Mutation succeeded");
                self.feedback.on_mutation_success(&response.message);
                self.invalidate_first_pages().await;
                Ok(response)
            }
            Err(e) => {
                warn!(kind = %R::KIND, action, code = e.code, error = %e, "Mutation failed");
                self.feedback.on_mutation_error(&e);
                Err(e)
            }
        }
    }

    /// 失效本资源所有默认每页条数下的首页缓存（不论排序和搜索）
    ///
    /// 命中的在途请求被中止；当前查询命中时立即重新拉取。返回失效的缓存条目数。
    pub async fn invalidate_first_pages(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        let count = self
            .cache
            .invalidate_where(|key| self.is_invalidation_target(key))
            .await;
        let aborted = self.abort_inflight();
        counter!(QUERY_INVALIDATIONS_TOTAL, "kind" => R::KIND.to_string()).increment(count);
        debug!(kind = %R::KIND, count, aborted, "Invalidated cached first pages");

        let (params, token) = self.current();
        if self.is_invalidation_target(&QueryKey::new(R::KIND, params.clone())) {
            let _ = self.run(params, token).await;
        }
        count
    }

    fn is_invalidation_target(&self, key: &QueryKey) -> bool {
        key.is_first_page_of(R::KIND, self.options.page_sizes.default)
    }

    /// 中止命中失效范围的在途请求，返回数量
    fn abort_inflight(&self) -> usize {
        let mut inflight = self.inflight.lock();
        let keys: Vec<QueryKey> = inflight
            .keys()
            .filter(|key| self.is_invalidation_target(key))
            .cloned()
            .collect();
        for key in &keys {
            if let Some(entry) = inflight.remove(key) {
                entry.abort.cancel();
            }
        }
        keys.len()
    }
}

/// 在途请求：领头者编号、结果广播和中止令牌
struct Inflight<R> {
    id: u64,
    sender: broadcast::Sender<FetchResult<R>>,
    abort: CancellationToken,
}

enum Role<R> {
    Lead { id: u64, abort: CancellationToken },
    Join(broadcast::Receiver<FetchResult<R>>),
}

/// 领头请求结束或被丢弃时移除在途记录
///
/// 只移除自己登记的条目；被失效中止后该 key 可能已有新的领头者。
struct InflightGuard<'a, R> {
    inflight: &'a InflightMap<R>,
    key: &'a QueryKey,
    id: u64,
    armed: bool,
}

impl<R> InflightGuard<'_, R> {
    fn finish(mut self) -> Option<broadcast::Sender<FetchResult<R>>> {
        self.armed = false;
        self.take().map(|entry| entry.sender)
    }

    /// 在途记录仍是自己登记的那一条
    fn is_current(&self) -> bool {
        self.inflight
            .lock()
            .get(self.key)
            .is_some_and(|entry| entry.id == self.id)
    }

    fn take(&self) -> Option<Inflight<R>> {
        let mut inflight = self.inflight.lock();
        let own = inflight
            .get(self.key)
            .is_some_and(|entry| entry.id == self.id);
        if own { inflight.remove(self.key) } else { None }
    }
}

impl<R> Drop for InflightGuard<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            self.take();
        }
    }
}
