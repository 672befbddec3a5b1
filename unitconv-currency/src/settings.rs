//! Local settings store: small string values plus cache payload files

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

/// Well-known setting keys and cache file names
pub mod keys {
    pub const CURRENCY_UNIT_FROM_KEY: &str = "CURRENCY_UNIT_FROM_KEY";
    pub const CURRENCY_UNIT_TO_KEY: &str = "CURRENCY_UNIT_TO_KEY";
    /// RFC 3339 time of the last successful web load
    pub const CACHE_TIMESTAMP_KEY: &str = "CURRENCY_CONVERTER_TIMESTAMP";
    pub const CACHE_LANGCODE_KEY: &str = "CURRENCY_CONVERTER_LANGCODE";
    pub const USER_PREFERENCES_KEY: &str = "UnitConverterPreferences";

    pub const STATIC_DATA_FILENAME: &str = "CURRENCY_CONVERTER_STATIC_DATA.txt";
    pub const ALL_RATIOS_DATA_FILENAME: &str = "CURRENCY_CONVERTER_ALL_RATIOS_DATA.txt";
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no cached file {0}")]
    MissingFile(String),
}

/// Key/value settings plus a folder of cache files.
#[async_trait]
pub trait LocalSettings: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;
    fn remove(&self, key: &str) -> Result<(), SettingsError>;

    async fn read_cache_file(&self, name: &str) -> Result<String, SettingsError>;
    async fn write_cache_file(&self, name: &str, contents: &str) -> Result<(), SettingsError>;

    /// Wait until every value set so far is durable
    async fn flush(&self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// In-process store, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
    files: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalSettings for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
        Ok(())
    }

    async fn read_cache_file(&self, name: &str) -> Result<String, SettingsError> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(name).cloned())
            .ok_or_else(|| SettingsError::MissingFile(name.to_string()))
    }

    async fn write_cache_file(&self, name: &str, contents: &str) -> Result<(), SettingsError> {
        if let Ok(mut files) = self.files.lock() {
            files.insert(name.to_string(), contents.to_string());
        }
        Ok(())
    }
}

/// Directory-backed store: `settings.json` for values, one file per cache payload.
///
/// `set` and `remove` update memory at once. Inside a tokio runtime the file is
/// rewritten on the blocking pool; `flush` waits for the latest snapshot.
#[derive(Debug)]
pub struct FileSettings {
    dir: PathBuf,
    values: Mutex<HashMap<String, String>>,
    revision: AtomicU64,
    /// Revision currently on disk
    written: Arc<Mutex<u64>>,
}

/// Write `text` unless a newer revision already reached the disk
fn persist(written: &Mutex<u64>, revision: u64, path: &Path, text: &str) -> Result<(), SettingsError> {
    let mut last = written.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if revision <= *last {
        return Ok(());
    }
    std::fs::write(path, text)?;
    *last = revision;
    Ok(())
}

impl FileSettings {
    const SETTINGS_FILE: &'static str = "settings.json";

    /// Open `dir`, creating it if needed. A missing settings file starts empty.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(Self::SETTINGS_FILE);
        let values = if path.exists() {
            let text = std::fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            HashMap::new()
        };
        debug!(dir = %dir.display(), entries = values.len(), "settings opened");

        Ok(Self { dir, values: Mutex::new(values), revision: AtomicU64::new(0), written: Arc::new(Mutex::new(0)) })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialized values and their revision, taken under one lock
    fn snapshot(&self, edit: impl FnOnce(&mut HashMap<String, String>)) -> Result<(String, u64), SettingsError> {
        let mut values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        edit(&mut values);
        let text = serde_json::to_string_pretty(&*values)?;
        Ok((text, self.revision.fetch_add(1, Ordering::SeqCst) + 1))
    }

    fn update(&self, edit: impl FnOnce(&mut HashMap<String, String>)) -> Result<(), SettingsError> {
        let (text, revision) = self.snapshot(edit)?;
        let path = self.dir.join(Self::SETTINGS_FILE);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let written = self.written.clone();
                handle.spawn_blocking(move || {
                    if let Err(e) = persist(&written, revision, &path, &text) {
                        warn!(error = %e, path = %path.display(), "failed to write settings");
                    }
                });
                Ok(())
            }
            Err(_) => persist(&self.written, revision, &path, &text),
        }
    }
}

#[async_trait]
impl LocalSettings for FileSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.update(|values| {
            values.remove(key);
        })
    }

    async fn read_cache_file(&self, name: &str) -> Result<String, SettingsError> {
        let path = self.dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(SettingsError::MissingFile(name.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_cache_file(&self, name: &str, contents: &str) -> Result<(), SettingsError> {
        tokio::fs::write(self.dir.join(name), contents).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), SettingsError> {
        let (text, revision) = self.snapshot(|_| {})?;
        let path = self.dir.join(Self::SETTINGS_FILE);
        let written = self.written.clone();
        tokio::task::spawn_blocking(move || persist(&written, revision, &path, &text))
            .await
            .map_err(std::io::Error::other)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_settings() {
        let settings = MemorySettings::new();
        assert_eq!(settings.get("k"), None);
        settings.set("k", "v").unwrap();
        assert_eq!(settings.get("k").as_deref(), Some("v"));
        settings.remove("k").unwrap();
        assert_eq!(settings.get("k"), None);

        assert!(matches!(settings.read_cache_file("a.txt").await, Err(SettingsError::MissingFile(_))));
        settings.write_cache_file("a.txt", "payload").await.unwrap();
        assert_eq!(settings.read_cache_file("a.txt").await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_file_settings_persist() {
        let dir = TempDir::new().unwrap();
        {
            let settings = FileSettings::open(dir.path()).unwrap();
            settings.set(keys::CACHE_LANGCODE_KEY, "en-US").unwrap();
            settings.set(keys::CURRENCY_UNIT_FROM_KEY, "USD").unwrap();
            settings.remove(keys::CURRENCY_UNIT_FROM_KEY).unwrap();
            settings.write_cache_file(keys::STATIC_DATA_FILENAME, "[]").await.unwrap();
            settings.flush().await.unwrap();
        }

        let reopened = FileSettings::open(dir.path()).unwrap();
        assert_eq!(reopened.get(keys::CACHE_LANGCODE_KEY).as_deref(), Some("en-US"));
        assert_eq!(reopened.get(keys::CURRENCY_UNIT_FROM_KEY), None);
        assert_eq!(reopened.read_cache_file(keys::STATIC_DATA_FILENAME).await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_file_settings_missing_cache() {
        let dir = TempDir::new().unwrap();
        let settings = FileSettings::open(dir.path().join("nested")).unwrap();
        let err = settings.read_cache_file(keys::ALL_RATIOS_DATA_FILENAME).await.unwrap_err();
        assert!(matches!(err, SettingsError::MissingFile(_)));
    }

    #[tokio::test]
    async fn test_file_settings_flush_keeps_latest_value() {
        let dir = TempDir::new().unwrap();
        let settings = FileSettings::open(dir.path()).unwrap();
        for code in ["USD", "EUR", "GBP", "JPY"] {
            settings.set(keys::CURRENCY_UNIT_TO_KEY, code).unwrap();
        }
        // Readable before anything reaches the disk
        assert_eq!(settings.get(keys::CURRENCY_UNIT_TO_KEY).as_deref(), Some("JPY"));
        settings.flush().await.unwrap();

        let reopened = FileSettings::open(dir.path()).unwrap();
        assert_eq!(reopened.get(keys::CURRENCY_UNIT_TO_KEY).as_deref(), Some("JPY"));
    }

    #[test]
    fn test_file_settings_write_through_without_runtime() {
        let dir = TempDir::new().unwrap();
        let settings = FileSettings::open(dir.path()).unwrap();
        settings.set(keys::CACHE_LANGCODE_KEY, "fr-FR").unwrap();

        let reopened = FileSettings::open(dir.path()).unwrap();
        assert_eq!(reopened.get(keys::CACHE_LANGCODE_KEY).as_deref(), Some("fr-FR"));
    }

    #[test]
    fn test_file_settings_rejects_corrupt_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), "not json").unwrap();
        assert!(matches!(FileSettings::open(dir.path()), Err(SettingsError::Json(_))));
    }
}
