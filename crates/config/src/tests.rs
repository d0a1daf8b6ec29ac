use crate::{ApiConfig, AppConfig};
use figment::Jail;
use secrecy::{ExposeSecret, Secret};

#[test]
fn test_defaults_match_dashboard_contract() {
    let config = AppConfig::default();
    assert_eq!(config.query.page_sizes, vec![10, 20, 30, 40, 50]);
    assert_eq!(config.query.default_page_size, 10);
    assert_eq!(config.query.retry.max_attempts, 3);
    assert!(config.api.with_credentials);
    assert_eq!(config.api.endpoints.members, "internal/members");
    assert!(config.validate().is_ok());
    assert!(!config.is_production());
}

#[test]
fn test_access_token_redaction() {
    let api = ApiConfig {
        access_token: Some(Secret::new("eyJhbGciOiJIUzI1NiJ9.secret".to_string())),
        ..ApiConfig::default()
    };
    let debug_output = format!("{:?}", api);
    assert!(!debug_output.contains("eyJhbGciOiJIUzI1NiJ9"));
    assert!(debug_output.contains("REDACTED"));
}

#[test]
fn test_load_merges_file_and_env() {
    Jail::expect_with(|jail| {
        jail.create_dir("config")?;
        jail.create_file(
            "config/default.toml",
            r#"
            app_name = "tmii"

            [api]
            base_url = "https://api.tmii.test/v1/"

            [query]
            default_page_size = 20
            "#,
        )?;
        jail.create_file(
            "config/production.toml",
            r#"
            app_env = "production"
            "#,
        )?;
        jail.set_env("APP_ENV", "production");
        jail.set_env("TMII_MOCK__ENABLED", "true");
        jail.set_env("TMII_API__ACCESS_TOKEN", "token-123");

        let config = AppConfig::load("config").map_err(|e| e.to_string())?;
        assert_eq!(config.app_name, "tmii");
        assert!(config.is_production());
        assert_eq!(config.api.base_url, "https://api.tmii.test/v1/");
        assert_eq!(config.query.default_page_size, 20);
        assert!(config.mock.enabled);
        assert_eq!(
            config.api.access_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("token-123")
        );
        Ok(())
    });
}

#[test]
fn test_invalid_default_page_size_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_dir("config")?;
        jail.create_file(
            "config/default.toml",
            r#"
            [query]
            page_sizes = [10, 20]
            default_page_size = 15
            "#,
        )?;
        assert!(AppConfig::load("config").is_err());
        Ok(())
    });
}
