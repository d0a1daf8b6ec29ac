//! 运行时初始化

use tmii_config::{AppConfig, ConfigError};
use tmii_telemetry::{describe_metrics, init_tracing, init_tracing_json};
use tracing::info;

/// 运行时配置
pub struct RuntimeConfig {
    pub config_dir: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            config_dir: std::env::var("TMII_CONFIG_DIR").unwrap_or_else(|_| "config".to_string()),
        }
    }
}

impl RuntimeConfig {
    /// 读取 `.env` 后加载配置
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let _ = dotenvy::dotenv();
        AppConfig::load(&self.config_dir)
    }
}

/// 初始化日志与指标描述
pub fn init_runtime(config: &AppConfig) {
    if config.telemetry.json || config.is_production() {
        init_tracing_json(&config.telemetry.log_level);
    } else {
        init_tracing(&config.telemetry.log_level);
    }
    describe_metrics();

    info!(
        app_name = %config.app_name,
        app_env = %config.app_env,
        mock = config.mock.enabled,
        "Runtime initialized"
    );
}
