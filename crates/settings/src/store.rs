//! SettingsStore 实现

use std::io::ErrorKind;
use std::path::PathBuf;

use parking_lot::Mutex;
use tmii_errors::{ApiError, AppResult};
use tmii_ports::SettingsStore;

/// 保存在本地 JSON 文件中
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn read(&self) -> AppResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ApiError::internal(format!(
                "Failed to read settings from {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn write(&self, document: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ApiError::internal(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(&self.path, document).map_err(|e| {
            ApiError::internal(format!(
                "Failed to write settings to {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

/// 仅保存在内存中
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    document: Mutex<Option<String>>,
}

impl InMemorySettingsStore {
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(document.into())),
        }
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn read(&self) -> AppResult<Option<String>> {
        Ok(self.document.lock().clone())
    }

    fn write(&self, document: &str) -> AppResult<()> {
        *self.document.lock() = Some(document.to_string());
        Ok(())
    }
}
