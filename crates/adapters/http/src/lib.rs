//! Authenticated HTTP transport for the dashboard API
//!
//! Every request carries the current bearer token. A 401 response starts a
//! token refresh; while it runs, further 401s queue behind it and replay once
//! it settles. All failures surface as `ApiError`.

mod config;
mod error;
mod executor;
mod refresh;
mod refresher;
mod request;
mod service;
mod token;
mod transport;

pub use config::TransportConfig;
pub use error::{ExecutorError, normalize_error};
pub use executor::{RequestExecutor, ReqwestExecutor};
pub use refresh::RefreshCoordinator;
pub use refresher::EndpointRefresher;
pub use request::{ApiRequest, RawResponse};
pub use service::RemoteResourceService;
pub use token::TokenStore;
pub use transport::HttpTransport;
