//! store::file
//!
//! JSON file store.
//!
//! # Design
//!
//! The whole store is one JSON document (a [`StoreSnapshot`]) loaded into a
//! [`MemoryStore`] on open. Every mutating call is applied in memory and then
//! persisted. Writes are atomic: the document goes to a temp file which is
//! then renamed over the original.
//!
//! A missing file is an empty store; the file is created on first write.
//!
//! # Example
//!
//! ```ignore
//! use pathbind::store::{FileStore, Store};
//!
//! let store = FileStore::open("store.json")?;
//! let item = store.create_item("relax", "job")?;
//! println!("created {}", item.id);
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::memory::{MemoryStore, StoreSnapshot};
use super::traits::{ContainerRecord, ItemRecord, Store, StoreError};
use crate::core::types::{ContainerId, ContainerKind, ItemId};

/// Store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl FileStore {
    /// Open the store at `path`, loading it if the file exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ReadError` if the file exists but cannot be read
    /// or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                StoreError::ReadError(format!("cannot read {}: {}", path.display(), e))
            })?;
            serde_json::from_str::<StoreSnapshot>(&content).map_err(|e| {
                StoreError::ReadError(format!("cannot parse {}: {}", path.display(), e))
            })?
        } else {
            StoreSnapshot::default()
        };
        tracing::debug!(
            path = %path.display(),
            containers = snapshot.containers.len(),
            items = snapshot.items.len(),
            "opened file store"
        );
        Ok(Self {
            path,
            memory: MemoryStore::from_snapshot(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory view; mutations through it are not persisted.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Create an item and persist it.
    pub fn create_item(&self, label: &str, kind: &str) -> Result<ItemRecord, StoreError> {
        let record = self.memory.create_item(label, kind);
        self.persist()?;
        Ok(record)
    }

    /// Write the current state to disk atomically.
    pub fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    StoreError::WriteError(format!("cannot create directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&self.memory.snapshot())
            .map_err(|e| StoreError::WriteError(format!("cannot serialize store: {}", e)))?;

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| StoreError::WriteError(format!("cannot create temp file: {}", e)))?;
            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::WriteError(format!("cannot write store: {}", e)))?;
            file.sync_all()
                .map_err(|e| StoreError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &self.path)
            .map_err(|e| StoreError::WriteError(format!("cannot rename temp file: {}", e)))?;
        Ok(())
    }
}

impl Store for FileStore {
    fn container(
        &self,
        label: &str,
        kind: &ContainerKind,
    ) -> Result<Option<ContainerRecord>, StoreError> {
        self.memory.container(label, kind)
    }

    fn container_by_id(&self, id: ContainerId) -> Result<Option<ContainerRecord>, StoreError> {
        self.memory.container_by_id(id)
    }

    fn containers_with_prefix(
        &self,
        prefix: &str,
        kind: &ContainerKind,
    ) -> Result<Vec<ContainerRecord>, StoreError> {
        self.memory.containers_with_prefix(prefix, kind)
    }

    fn create_container(
        &self,
        label: &str,
        kind: &ContainerKind,
    ) -> Result<ContainerRecord, StoreError> {
        let record = self.memory.create_container(label, kind)?;
        self.persist()?;
        Ok(record)
    }

    fn delete_container(&self, id: ContainerId) -> Result<(), StoreError> {
        self.memory.delete_container(id)?;
        self.persist()
    }

    fn item(&self, id: ItemId) -> Result<Option<ItemRecord>, StoreError> {
        self.memory.item(id)
    }

    fn members(&self, container: ContainerId) -> Result<Vec<ItemRecord>, StoreError> {
        self.memory.members(container)
    }

    fn items_with_alias(
        &self,
        container: ContainerId,
        key: &str,
        alias: &str,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        self.memory.items_with_alias(container, key, alias)
    }

    fn memberships(&self, item: ItemId) -> Result<Vec<ContainerRecord>, StoreError> {
        self.memory.memberships(item)
    }

    fn get_metadata(
        &self,
        item: ItemId,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        self.memory.get_metadata(item, key)
    }

    fn set_metadata(
        &self,
        item: ItemId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.memory.set_metadata(item, key, value)?;
        self.persist()
    }

    fn add_members(&self, container: ContainerId, items: &[ItemId]) -> Result<(), StoreError> {
        self.memory.add_members(container, items)?;
        self.persist()
    }
}
