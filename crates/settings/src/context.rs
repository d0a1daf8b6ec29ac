//! 设置上下文

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tmii_errors::AppResult;
use tmii_ports::SettingsStore;
use tracing::{debug, warn};

/// 界面主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// 界面状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiSettings {
    pub is_loading: bool,
    pub theme: Theme,
    pub sidebar_open: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            is_loading: false,
            theme: Theme::Light,
            sidebar_open: true,
        }
    }
}

/// 持久化的部分
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedUi {
    theme: Theme,
    sidebar_open: bool,
}

impl Default for PersistedUi {
    fn default() -> Self {
        let defaults = UiSettings::default();
        Self {
            theme: defaults.theme,
            sidebar_open: defaults.sidebar_open,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    ui: PersistedUi,
}

/// `{"state":{"ui":{...}},"version":0}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// 进程内唯一的界面设置
pub struct SettingsContext {
    settings: RwLock<UiSettings>,
    store: Option<Arc<dyn SettingsStore>>,
}

impl SettingsContext {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings: RwLock::new(UiSettings::default()),
            store: Some(store),
        }
    }

    /// 不持久化
    pub fn ephemeral() -> Self {
        Self {
            settings: RwLock::new(UiSettings::default()),
            store: None,
        }
    }

    pub fn current(&self) -> UiSettings {
        self.settings.read().clone()
    }

    pub fn set_loading(&self, is_loading: bool) {
        self.settings.write().is_loading = is_loading;
    }

    pub fn set_theme(&self, theme: Theme) -> AppResult<()> {
        self.settings.write().theme = theme;
        self.persist()
    }

    /// 返回切换后的状态
    pub fn toggle_sidebar(&self) -> AppResult<bool> {
        let open = {
            let mut settings = self.settings.write();
            settings.sidebar_open = !settings.sidebar_open;
            settings.sidebar_open
        };
        self.persist()?;
        Ok(open)
    }

    /// 从存储恢复主题和侧边栏状态
    ///
    /// 文档损坏时保留默认值。
    pub fn hydrate(&self) -> AppResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let Some(raw) = store.read()? else {
            debug!("No persisted settings");
            return Ok(());
        };

        match serde_json::from_str::<Document>(&raw) {
            Ok(document) => {
                let mut settings = self.settings.write();
                settings.theme = document.state.ui.theme;
                settings.sidebar_open = document.state.ui.sidebar_open;
                debug!(theme = ?settings.theme, sidebar_open = settings.sidebar_open, "Settings hydrated");
            }
            Err(e) => warn!(error = %e, "Ignoring unreadable persisted settings"),
        }
        Ok(())
    }

    pub fn persist(&self) -> AppResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let document = {
            let settings = self.settings.read();
            Document {
                state: PersistedState {
                    ui: PersistedUi {
                        theme: settings.theme,
                        sidebar_open: settings.sidebar_open,
                    },
                },
                version: 0,
            }
        };
        store.write(&serde_json::to_string(&document)?)
    }
}
