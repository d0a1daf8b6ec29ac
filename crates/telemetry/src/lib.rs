//! telemetry - 可观测性库

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 传输层请求计数
pub const TRANSPORT_REQUESTS_TOTAL: &str = "tmii_transport_requests_total";
/// 令牌刷新次数
pub const TRANSPORT_REFRESH_TOTAL: &str = "tmii_transport_refresh_total";
/// 列表拉取次数（不含缓存命中）
pub const QUERY_FETCH_TOTAL: &str = "tmii_query_fetch_total";
/// 缓存失效次数
pub const QUERY_INVALIDATIONS_TOTAL: &str = "tmii_query_invalidations_total";

/// 初始化 tracing
///
/// 已有全局 subscriber 时静默跳过。
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 初始化 JSON 格式的 tracing（生产环境）
pub fn init_tracing_json(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .try_init();
}

/// 注册指标描述
pub fn describe_metrics() {
    metrics::describe_counter!(TRANSPORT_REQUESTS_TOTAL, "Outbound API requests by method and status");
    metrics::describe_counter!(TRANSPORT_REFRESH_TOTAL, "Token refresh attempts by outcome");
    metrics::describe_counter!(QUERY_FETCH_TOTAL, "List fetches that reached the collaborator");
    metrics::describe_counter!(QUERY_INVALIDATIONS_TOTAL, "Cache entries invalidated after mutations");
}
