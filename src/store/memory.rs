//! store::memory
//!
//! In-memory store implementation.
//!
//! # Design
//!
//! State lives behind an `Arc<Mutex<...>>` so clones share one store. Every
//! read query bumps a counter, which is how tests verify that batch mode
//! actually saves round trips.
//!
//! # Example
//!
//! ```
//! use pathbind::core::types::ContainerKind;
//! use pathbind::store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let kind = ContainerKind::default();
//! let group = store.create_container("a/b", &kind).unwrap();
//! let item = store.create_item("calc", "job");
//! store.add_members(group.id, &[item.id]).unwrap();
//!
//! assert_eq!(store.members(group.id).unwrap().len(), 1);
//! assert!(store.query_count() > 0);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::traits::{ContainerRecord, ItemRecord, Store, StoreError};
use crate::core::types::{ContainerId, ContainerKind, ItemId};

/// A container together with its ordered member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerEntry {
    #[serde(flatten)]
    pub record: ContainerRecord,
    #[serde(default)]
    pub members: Vec<ItemId>,
}

/// Serializable image of a whole store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub containers: Vec<ContainerEntry>,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    state: StoreSnapshot,
    queries: usize,
}

impl MemoryStoreInner {
    fn entry(&self, id: ContainerId) -> Option<&ContainerEntry> {
        self.state.containers.iter().find(|c| c.record.id == id)
    }

    fn item(&self, id: ItemId) -> Option<&ItemRecord> {
        self.state.items.iter().find(|i| i.id == id)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut ItemRecord> {
        self.state.items.iter_mut().find(|i| i.id == id)
    }

    fn members(&self, entry: &ContainerEntry) -> Vec<ItemRecord> {
        entry
            .members
            .iter()
            .filter_map(|id| self.item(*id).cloned())
            .collect()
    }
}

/// In-memory store.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from a snapshot.
    pub fn from_snapshot(state: StoreSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MemoryStoreInner { state, queries: 0 })),
        }
    }

    /// Copy out the full state.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().state.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a new item with empty metadata.
    pub fn create_item(&self, label: &str, kind: &str) -> ItemRecord {
        let record = ItemRecord {
            id: ItemId::new_v4(),
            label: label.to_string(),
            kind: kind.to_string(),
            created: Utc::now(),
            metadata: Default::default(),
        };
        self.lock().state.items.push(record.clone());
        record
    }

    /// Number of read queries served since creation or the last reset.
    pub fn query_count(&self) -> usize {
        self.lock().queries
    }

    pub fn reset_query_count(&self) {
        self.lock().queries = 0;
    }

    fn query(&self) -> MutexGuard<'_, MemoryStoreInner> {
        let mut inner = self.lock();
        inner.queries += 1;
        inner
    }
}

impl Store for MemoryStore {
    fn container(
        &self,
        label: &str,
        kind: &ContainerKind,
    ) -> Result<Option<ContainerRecord>, StoreError> {
        let inner = self.query();
        Ok(inner
            .state
            .containers
            .iter()
            .find(|c| c.record.label == label && &c.record.kind == kind)
            .map(|c| c.record.clone()))
    }

    fn container_by_id(&self, id: ContainerId) -> Result<Option<ContainerRecord>, StoreError> {
        let inner = self.query();
        Ok(inner.entry(id).map(|c| c.record.clone()))
    }

    fn containers_with_prefix(
        &self,
        prefix: &str,
        kind: &ContainerKind,
    ) -> Result<Vec<ContainerRecord>, StoreError> {
        let inner = self.query();
        let mut found: Vec<ContainerRecord> = inner
            .state
            .containers
            .iter()
            .filter(|c| &c.record.kind == kind && c.record.label.starts_with(prefix))
            .map(|c| c.record.clone())
            .collect();
        found.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(found)
    }

    fn create_container(
        &self,
        label: &str,
        kind: &ContainerKind,
    ) -> Result<ContainerRecord, StoreError> {
        let mut inner = self.lock();
        if inner
            .state
            .containers
            .iter()
            .any(|c| c.record.label == label && &c.record.kind == kind)
        {
            return Err(StoreError::DuplicateContainer {
                label: label.to_string(),
                kind: kind.clone(),
            });
        }
        let record = ContainerRecord {
            id: ContainerId::new_v4(),
            label: label.to_string(),
            kind: kind.clone(),
            description: String::new(),
            created: Utc::now(),
        };
        inner.state.containers.push(ContainerEntry {
            record: record.clone(),
            members: Vec::new(),
        });
        Ok(record)
    }

    fn delete_container(&self, id: ContainerId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let before = inner.state.containers.len();
        inner.state.containers.retain(|c| c.record.id != id);
        if inner.state.containers.len() == before {
            return Err(StoreError::ContainerNotFound(id));
        }
        Ok(())
    }

    fn item(&self, id: ItemId) -> Result<Option<ItemRecord>, StoreError> {
        let inner = self.query();
        Ok(inner.item(id).cloned())
    }

    fn members(&self, container: ContainerId) -> Result<Vec<ItemRecord>, StoreError> {
        let inner = self.query();
        let entry = inner
            .entry(container)
            .ok_or(StoreError::ContainerNotFound(container))?;
        Ok(inner.members(entry))
    }

    fn items_with_alias(
        &self,
        container: ContainerId,
        key: &str,
        alias: &str,
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let inner = self.query();
        let entry = inner
            .entry(container)
            .ok_or(StoreError::ContainerNotFound(container))?;
        let container_key = container.to_string();
        Ok(inner
            .members(entry)
            .into_iter()
            .filter(|item| {
                item.metadata
                    .get(key)
                    .and_then(|map| map.get(&container_key))
                    .and_then(|value| value.as_str())
                    == Some(alias)
            })
            .collect())
    }

    fn memberships(&self, item: ItemId) -> Result<Vec<ContainerRecord>, StoreError> {
        let inner = self.query();
        if inner.item(item).is_none() {
            return Err(StoreError::ItemNotFound(item));
        }
        Ok(inner
            .state
            .containers
            .iter()
            .filter(|c| c.members.contains(&item))
            .map(|c| c.record.clone())
            .collect())
    }

    fn get_metadata(
        &self,
        item: ItemId,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        let inner = self.query();
        let record = inner.item(item).ok_or(StoreError::ItemNotFound(item))?;
        Ok(record.metadata.get(key).cloned())
    }

    fn set_metadata(
        &self,
        item: ItemId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let record = inner.item_mut(item).ok_or(StoreError::ItemNotFound(item))?;
        record.metadata.insert(key.to_string(), value);
        Ok(())
    }

    fn add_members(&self, container: ContainerId, items: &[ItemId]) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if let Some(missing) = items.iter().find(|id| inner.item(**id).is_none()) {
            return Err(StoreError::ItemNotFound(*missing));
        }
        let entry = inner
            .state
            .containers
            .iter_mut()
            .find(|c| c.record.id == container)
            .ok_or(StoreError::ContainerNotFound(container))?;
        for id in items {
            if !entry.members.contains(id) {
                entry.members.push(*id);
            }
        }
        Ok(())
    }
}
