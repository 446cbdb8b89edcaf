//! Local settings snapshot
//!
//! A small JSON key/value file holding client-side preferences such as the last saved
//! profile. A missing file opens as an empty store. Writes go to a sibling temporary
//! file that is renamed over the snapshot.

use crate::error::{DashboardError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Key under which the saved profile is mirrored
pub const PROFILE_KEY: &str = "profile";

/// JSON key/value snapshot backed by one file
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, Value>,
}

impl SettingsStore {
    /// Store that is never written to disk
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the snapshot at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a JSON object.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !fs::try_exists(&path).await? {
            debug!(path = %path.display(), "No settings snapshot, starting empty");
            return Ok(Self {
                path: Some(path),
                values: BTreeMap::new(),
            });
        }

        let data = fs::read_to_string(&path).await?;
        let values: BTreeMap<String, Value> = serde_json::from_str(&data).map_err(|e| {
            DashboardError::configuration(format!(
                "Failed to parse settings snapshot {}: {e}",
                path.display()
            ))
        })?;

        info!(path = %path.display(), keys = values.len(), "Loaded settings snapshot");
        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Open the snapshot at `path`, starting empty over a file that cannot be parsed
    ///
    /// The unreadable contents are replaced on the next [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn open_or_empty(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match Self::open(path).await {
            Err(DashboardError::Configuration { message }) => {
                warn!(path = %path.display(), error = %message, "Discarding unreadable settings snapshot");
                Ok(Self {
                    path: Some(path.to_path_buf()),
                    values: BTreeMap::new(),
                })
            }
            other => other,
        }
    }

    /// Backing file, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw value for a key
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Typed value for a key; `None` if missing or of another shape
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a key
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented as JSON.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        self.values.insert(key.into(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Remove a key, returning its previous value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Write the snapshot; a no-op for in-memory stores
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be written.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };

        let data = serde_json::to_string_pretty(&self.values)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut tmp = OsString::from(path.as_os_str());
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "Saved settings snapshot");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json")).await.unwrap();
        assert_eq!(store.keys().count(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::open(&path).await.unwrap();
        store.set("theme", &"dark").unwrap();
        store.set("zoom", &7_u8).unwrap();
        store.save().await.unwrap();

        let reopened = SettingsStore::open(&path).await.unwrap();
        assert_eq!(reopened.get::<String>("theme").as_deref(), Some("dark"));
        assert_eq!(reopened.get::<u8>("zoom"), Some(7));
        assert_eq!(reopened.get::<u8>("theme"), None);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "[1, 2").await.unwrap();

        let err = SettingsStore::open(&path).await.unwrap_err();
        assert!(matches!(err, DashboardError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_file_reopens_empty_and_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "{\"profile\": {\"role\"").await.unwrap();

        let mut store = SettingsStore::open_or_empty(&path).await.unwrap();
        assert_eq!(store.keys().count(), 0);
        assert_eq!(store.path(), Some(path.as_path()));

        store.set("theme", &"light").unwrap();
        store.save().await.unwrap();

        let reopened = SettingsStore::open(&path).await.unwrap();
        assert_eq!(reopened.get::<String>("theme").as_deref(), Some("light"));
    }

    #[tokio::test]
    async fn test_save_leaves_no_temporary_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let mut store = SettingsStore::open(&path).await.unwrap();
        store.set("zoom", &3_u8).unwrap();
        store.save().await.unwrap();
        store.set("zoom", &4_u8).unwrap();
        store.save().await.unwrap();

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["settings.json".to_string()]);
        assert_eq!(SettingsStore::open(&path).await.unwrap().get::<u8>("zoom"), Some(4));
    }

    #[tokio::test]
    async fn test_in_memory_save_is_noop() {
        let mut store = SettingsStore::in_memory();
        store.set("k", &1).unwrap();
        assert!(store.remove("k").is_some());
        store.save().await.unwrap();
        assert_eq!(store.path(), None);
    }
}
