//! tmii-config - 配置加载库
//!
//! 加载顺序：`default.toml` → `<APP_ENV>.toml` → `TMII_` 前缀环境变量（`__` 分隔层级）

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::Secret;
use serde::Deserialize;
use thiserror::Error;
use tmii_common::{PageSizeOptions, RetryConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 各资源的接口路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub members: String,
    pub users: String,
    pub transactions: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            members: "internal/members".to_string(),
            users: "internal/users".to_string(),
            transactions: "transaction/".to_string(),
        }
    }
}

/// 远程 API 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// 是否携带 cookie
    pub with_credentials: bool,
    pub timeout_secs: u64,
    pub access_token: Option<Secret<String>>,
    pub refresh_path: String,
    /// 命中这些片段的请求不会触发刷新
    pub auth_exempt_paths: Vec<String>,
    pub endpoints: EndpointsConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200/api/v1/".to_string(),
            with_credentials: true,
            timeout_secs: 30,
            access_token: None,
            refresh_path: "auth/refresh-token".to_string(),
            auth_exempt_paths: vec!["/login".to_string(), "/refresh-token".to_string()],
            endpoints: EndpointsConfig::default(),
        }
    }
}

/// 查询重试配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryRetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for QueryRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

/// 列表查询配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub page_sizes: Vec<u32>,
    pub default_page_size: u32,
    pub stale_time_secs: u64,
    pub gc_time_secs: u64,
    pub retry: QueryRetryConfig,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_sizes: vec![10, 20, 30, 40, 50],
            default_page_size: 10,
            stale_time_secs: 60,
            gc_time_secs: 300,
            retry: QueryRetryConfig::default(),
        }
    }
}

impl QueryConfig {
    pub fn page_size_options(&self) -> Result<PageSizeOptions, ConfigError> {
        PageSizeOptions::new(self.page_sizes.clone(), self.default_page_size)
            .map_err(|e| ConfigError::Invalid(e.message))
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.initial_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
        )
    }

    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }
}

/// 演示模式（内存数据）配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub enabled: bool,
    pub fetch_latency_ms: u64,
    pub mutation_latency_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            fetch_latency_ms: 500,
            mutation_latency_ms: 300,
        }
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

/// 界面设置持久化配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub path: Option<String>,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: Some("app-storage.json".to_string()),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub api: ApiConfig,
    pub query: QueryConfig,
    pub mock: MockConfig,
    pub telemetry: TelemetryConfig,
    pub settings: SettingsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "tmii-dashboard".to_string(),
            app_env: "development".to_string(),
            api: ApiConfig::default(),
            query: QueryConfig::default(),
            mock: MockConfig::default(),
            telemetry: TelemetryConfig::default(),
            settings: SettingsConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Self::figment(config_dir, &env).extract()?;
        config.validate()?;

        Ok(config)
    }

    fn figment(config_dir: &str, env: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("TMII_").split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.query.page_size_options()?;
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

#[cfg(test)]
mod tests;
