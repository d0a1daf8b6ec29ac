//! 仪表盘装配

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tmii_adapter_http::{
    EndpointRefresher, ExecutorError, HttpTransport, RemoteResourceService, ReqwestExecutor,
    TokenStore, TransportConfig,
};
use tmii_adapter_memory::{
    InMemoryResourceStore, MockLatency, MockRecord, seed_members, seed_transactions, seed_users,
};
use tmii_config::{AppConfig, ConfigError};
use tmii_domain_core::{Member, Transaction, User};
use tmii_errors::{ApiError, AppResult};
use tmii_ports::{Notifier, ResourceService, TracingNotifier};
use tmii_query::{ControllerOptions, ResourceController, UiFeedback};
use tmii_settings::{JsonFileSettingsStore, SettingsContext};
use tracing::{info, warn};

/// 装配失败
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Transport(#[from] ExecutorError),

    #[error("Failed to restore settings: {0}")]
    Settings(#[from] ApiError),
}

/// 数据来源
enum Backend {
    Mock(MockLatency),
    Remote {
        transport: Arc<HttpTransport>,
        tokens: Arc<TokenStore>,
    },
}

impl Backend {
    fn from_config(config: &AppConfig) -> Result<Self, BootstrapError> {
        if config.mock.enabled {
            info!("Using in-memory demo data");
            return Ok(Self::Mock(MockLatency::new(
                Duration::from_millis(config.mock.fetch_latency_ms),
                Duration::from_millis(config.mock.mutation_latency_ms),
            )));
        }

        let transport_config = TransportConfig {
            base_url: config.api.base_url.clone(),
            with_credentials: config.api.with_credentials,
            timeout: Duration::from_secs(config.api.timeout_secs),
            refresh_path: config.api.refresh_path.clone(),
            auth_exempt_paths: config.api.auth_exempt_paths.clone(),
            production: config.is_production(),
        };

        let executor = Arc::new(ReqwestExecutor::new(&transport_config)?);
        let tokens = Arc::new(TokenStore::new(config.api.access_token.clone()));
        let refresher = EndpointRefresher::new(
            executor.clone(),
            tokens.clone(),
            transport_config.refresh_path.clone(),
            transport_config.production,
        );
        let transport = Arc::new(
            HttpTransport::new(executor, tokens.clone(), transport_config)
                .with_refresher(Arc::new(refresher)),
        );

        info!(base_url = %config.api.base_url, "Using remote API");
        Ok(Self::Remote { transport, tokens })
    }

    fn tokens(&self) -> Option<Arc<TokenStore>> {
        match self {
            Self::Mock(_) => None,
            Self::Remote { tokens, .. } => Some(tokens.clone()),
        }
    }

    fn service<R: MockRecord>(
        &self,
        seed: fn() -> Vec<R>,
        endpoint: &str,
    ) -> Arc<dyn ResourceService<R>> {
        match self {
            Self::Mock(latency) => Arc::new(InMemoryResourceStore::new(seed()).with_latency(*latency)),
            Self::Remote { transport, .. } => {
                Arc::new(RemoteResourceService::new(transport.clone(), endpoint))
            }
        }
    }
}

/// 三个资源控制器加界面设置
pub struct Dashboard {
    pub members: ResourceController<Member>,
    pub users: ResourceController<User>,
    pub transactions: ResourceController<Transaction>,
    pub settings: SettingsContext,
    tokens: Option<Arc<TokenStore>>,
}

impl Dashboard {
    pub fn build(config: &AppConfig) -> Result<Self, BootstrapError> {
        Self::build_with(config, Arc::new(TracingNotifier))
    }

    /// 使用自定义提示通道装配
    pub fn build_with(config: &AppConfig, notifier: Arc<dyn Notifier>) -> Result<Self, BootstrapError> {
        config.validate()?;

        let options = ControllerOptions {
            page_sizes: config.query.page_size_options()?,
            stale_time: config.query.stale_time(),
            gc_time: config.query.gc_time(),
            retry: config.query.retry_config(),
        };
        let backend = Backend::from_config(config)?;
        let tokens = backend.tokens();
        let feedback = Arc::new(session_feedback(notifier, tokens.clone()));
        let endpoints = &config.api.endpoints;

        let settings = match &config.settings.path {
            Some(path) => SettingsContext::new(Arc::new(JsonFileSettingsStore::new(path))),
            None => SettingsContext::ephemeral(),
        };
        settings.hydrate()?;

        Ok(Self {
            members: ResourceController::new(
                backend.service(seed_members, &endpoints.members),
                options.clone(),
            )
            .with_feedback(feedback.clone()),
            users: ResourceController::new(
                backend.service(seed_users, &endpoints.users),
                options.clone(),
            )
            .with_feedback(feedback.clone()),
            transactions: ResourceController::new(
                backend.service(seed_transactions, &endpoints.transactions),
                options,
            )
            .with_feedback(feedback),
            settings,
            tokens,
        })
    }

    pub fn is_mock(&self) -> bool {
        self.tokens.is_none()
    }

    pub fn tokens(&self) -> Option<&Arc<TokenStore>> {
        self.tokens.as_ref()
    }

    /// 并发加载三个列表的当前页，期间标记全局加载状态
    pub async fn load_all(&self) -> AppResult<()> {
        self.settings.set_loading(true);
        let (members, users, transactions) = tokio::join!(
            self.members.load(),
            self.users.load(),
            self.transactions.load()
        );
        self.settings.set_loading(false);

        members?;
        users?;
        transactions?;
        Ok(())
    }
}

/// 鉴权失败时清除令牌，由界面引导重新登录
fn session_feedback(notifier: Arc<dyn Notifier>, tokens: Option<Arc<TokenStore>>) -> UiFeedback {
    UiFeedback::new(notifier).with_auth_callback(move |err| {
        if let Some(tokens) = &tokens {
            tokens.clear();
        }
        warn!(code = err.code, "Session rejected, sign in again");
    })
}
