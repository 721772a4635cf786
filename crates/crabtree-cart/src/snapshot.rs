// SPDX-FileCopyrightText: 2026 Crabtree Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Where cart snapshots live between sessions.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crabtree_core::ShopError;

/// Durable slot holding one serialized cart.
pub trait SnapshotStore: Send + Sync {
    /// The stored snapshot, or `None` if nothing has been saved yet.
    fn load(&self) -> Result<Option<String>, ShopError>;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: &str) -> Result<(), ShopError>;
}

/// JSON file on disk, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, action: &str, e: std::io::Error) -> ShopError {
        ShopError::Storage {
            message: format!("cannot {action} cart snapshot {}", self.path.display()),
            source: Some(Box::new(e)),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<String>, ShopError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err("read", e)),
        }
    }

    fn save(&self, snapshot: &str) -> Result<(), ShopError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err("create directory for", e))?;
            }
        }
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, snapshot).map_err(|e| self.io_err("write", e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| self.io_err("replace", e))
    }
}

/// In-process slot, for tests and ephemeral carts.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `snapshot` already stored.
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot.into())),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<String>, ShopError> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| ShopError::Internal("cart snapshot lock poisoned".into()))?;
        Ok(slot.clone())
    }

    fn save(&self, snapshot: &str) -> Result<(), ShopError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| ShopError::Internal("cart snapshot lock poisoned".into()))?;
        *slot = Some(snapshot.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrips_and_creates_parents() {
        let dir = tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("carts/me.json"));
        assert_eq!(store.load().unwrap(), None);

        store.save("{\"items\":[]}").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("{\"items\":[]}"));
        assert!(!dir.path().join("carts/me.json.tmp").exists());
    }

    #[test]
    fn memory_store_overwrites() {
        let store = MemorySnapshotStore::with_snapshot("old");
        store.save("new").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("new"));
    }
}
