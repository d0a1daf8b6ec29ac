//! 装配冒烟测试（不访问网络）

use std::path::PathBuf;

use tmii_adapter_memory::{seed_members, seed_transactions, seed_users};
use tmii_bootstrap::{BootstrapError, Dashboard};
use tmii_config::AppConfig;
use tmii_settings::Theme;

fn mock_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.mock.enabled = true;
    config.mock.fetch_latency_ms = 0;
    config.mock.mutation_latency_ms = 0;
    config.settings.path = None;
    config
}

fn temp_settings_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("tmii-bootstrap-{}", uuid::Uuid::new_v4()))
        .join("app-storage.json")
}

#[tokio::test]
async fn test_mock_dashboard_loads_every_list() {
    let dashboard = Dashboard::build(&mock_config()).unwrap();
    assert!(dashboard.is_mock());
    assert!(dashboard.tokens().is_none());

    dashboard.load_all().await.unwrap();

    let members = dashboard.members.snapshot();
    assert_eq!(members.items().len(), 10);
    assert_eq!(members.count(), seed_members().len() as u64);
    assert_eq!(dashboard.users.snapshot().count(), seed_users().len() as u64);
    assert_eq!(
        dashboard.transactions.snapshot().count(),
        seed_transactions().len() as u64
    );
    assert!(!dashboard.settings.current().is_loading);
}

#[tokio::test]
async fn test_remote_dashboard_builds_without_network() {
    let mut config = AppConfig::default();
    config.settings.path = None;

    let dashboard = Dashboard::build(&config).unwrap();

    assert!(!dashboard.is_mock());
    let tokens = dashboard.tokens().unwrap();
    assert!(!tokens.has_token());
}

#[test]
fn test_invalid_page_sizes_are_rejected() {
    let mut config = mock_config();
    config.query.default_page_size = 15;

    let err = Dashboard::build(&config).err().unwrap();
    assert!(matches!(err, BootstrapError::Config(_)));
}

#[test]
fn test_theme_survives_rebuild() {
    let path = temp_settings_path();
    let mut config = mock_config();
    config.settings.path = Some(path.to_string_lossy().into_owned());

    let first = Dashboard::build(&config).unwrap();
    assert_eq!(first.settings.current().theme, Theme::Light);
    first.settings.set_theme(Theme::Dark).unwrap();
    assert!(!first.settings.toggle_sidebar().unwrap());

    let second = Dashboard::build(&config).unwrap();
    let restored = second.settings.current();
    assert_eq!(restored.theme, Theme::Dark);
    assert!(!restored.sidebar_open);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
