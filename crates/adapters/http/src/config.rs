//! Transport configuration

use std::time::Duration;

/// Transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base URL all request paths are joined onto
    pub base_url: String,
    /// Keep a cookie store so the refresh cookie travels with requests
    pub with_credentials: bool,
    pub timeout: Duration,
    /// Path of the token refresh endpoint, relative to `base_url`
    pub refresh_path: String,
    /// Requests whose path contains one of these never trigger a refresh
    pub auth_exempt_paths: Vec<String>,
    /// Hide raw failure messages and skip request logs
    pub production: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200/api/v1/".to_string(),
            with_credentials: true,
            timeout: Duration::from_secs(30),
            refresh_path: "auth/refresh-token".to_string(),
            auth_exempt_paths: vec!["/login".to_string(), "/refresh-token".to_string()],
            production: false,
        }
    }
}

impl TransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = production;
        self
    }

    /// Whether a request to `path` may trigger a refresh
    pub fn is_auth_exempt(&self, path: &str) -> bool {
        self.auth_exempt_paths
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_and_refresh_are_exempt() {
        let config = TransportConfig::default();
        assert!(config.is_auth_exempt("auth/login"));
        assert!(config.is_auth_exempt("/auth/refresh-token"));
        assert!(!config.is_auth_exempt("internal/members"));
    }
}
