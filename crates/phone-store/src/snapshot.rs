//! Full-snapshot JSON persistence.

use crate::error::StoreError;
use serde::{de::DeserializeOwned, Serialize};
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info, warn};

/// Pretty-printed JSON file, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write the whole value, replacing any previous snapshot.
    pub async fn save<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(value)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Write atomically using temp file + rename
        let temp_path = self.temp_path();
        fs::write(&temp_path, &data).await?;
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                warn!("Failed to remove {:?}: {}", temp_path, cleanup);
            }
            return Err(e.into());
        }

        debug!("Saved snapshot ({} bytes) to {:?}", data.len(), self.path);
        Ok(())
    }

    /// Read the snapshot back. A missing file yields the default value.
    pub async fn load<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        if !fs::try_exists(&self.path).await? {
            info!("Snapshot not found at {:?}, starting empty", self.path);
            return Ok(T::default());
        }

        let data = fs::read(&self.path).await?;
        let value = serde_json::from_slice(&data)?;

        debug!("Loaded snapshot ({} bytes) from {:?}", data.len(), self.path);
        Ok(value)
    }

    /// Move an unreadable snapshot aside to `<path>.corrupt` so the next save
    /// does not overwrite it. Returns where it went, if it existed.
    pub async fn quarantine(&self) -> Result<Option<PathBuf>, StoreError> {
        if !fs::try_exists(&self.path).await? {
            return Ok(None);
        }

        let target = self.sibling("corrupt");
        fs::rename(&self.path, &target).await?;

        warn!("Moved unreadable snapshot {:?} to {:?}", self.path, target);
        Ok(Some(target))
    }

    /// `<path>.tmp`; appended rather than substituted so paths that differ
    /// only by extension never share a temp file.
    fn temp_path(&self) -> PathBuf {
        self.sibling("tmp")
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".");
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Keeps nothing; for tests or when persistence is turned off.
#[derive(Debug, Clone)]
pub struct MemorySnapshot;

impl MemorySnapshot {
    pub async fn save<T: Serialize>(&self, _value: &T) -> Result<(), StoreError> {
        debug!("Memory snapshot: save is a no-op");
        Ok(())
    }

    pub async fn load<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        Ok(T::default())
    }
}

/// Snapshot backend behind a store.
#[derive(Debug, Clone)]
pub enum Snapshot {
    /// JSON file on disk
    File(FileSnapshot),
    /// No persistence
    Memory(MemorySnapshot),
}

impl Snapshot {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Snapshot::File(FileSnapshot::new(path))
    }

    pub fn memory() -> Self {
        Snapshot::Memory(MemorySnapshot)
    }

    pub async fn save<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        match self {
            Snapshot::File(s) => s.save(value).await,
            Snapshot::Memory(s) => s.save(value).await,
        }
    }

    pub async fn load<T: DeserializeOwned + Default>(&self) -> Result<T, StoreError> {
        match self {
            Snapshot::File(s) => s.load().await,
            Snapshot::Memory(s) => s.load().await,
        }
    }

    /// Set an unreadable snapshot aside. Memory snapshots have nothing to move.
    pub async fn quarantine(&self) -> Result<Option<PathBuf>, StoreError> {
        match self {
            Snapshot::File(s) => s.quarantine().await,
            Snapshot::Memory(_) => Ok(None),
        }
    }
}
