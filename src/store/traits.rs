//! store::traits
//!
//! Backing store trait definition and record types.
//!
//! # Design
//!
//! The `Store` trait is the only doorway to persisted containers and items.
//! Every path-level concept (aliases, virtual paths, history) is layered on
//! top of it by the resolver; the store itself knows nothing about paths
//! beyond label prefixes.
//!
//! Methods take `&self`. Implementations that mutate use interior
//! mutability, which lets many resolvers share one store reference.
//!
//! Query results are returned as owned vectors. A store is free to back
//! them with a cursor internally, but callers never hold one across a
//! mutation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{ContainerId, ContainerKind, ItemId};

/// Errors from backing store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No container with this id exists.
    #[error("container not found: {0}")]
    ContainerNotFound(ContainerId),

    /// No item with this id exists.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// A container with this (label, kind) already exists.
    #[error("container already exists: {label} ({kind})")]
    DuplicateContainer { label: String, kind: ContainerKind },

    /// Failed to read persisted state.
    #[error("failed to read store: {0}")]
    ReadError(String),

    /// Failed to write persisted state.
    #[error("failed to write store: {0}")]
    WriteError(String),
}

/// A container as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: ContainerId,
    /// Full delimiter-joined label.
    pub label: String,
    pub kind: ContainerKind,
    #[serde(default)]
    pub description: String,
    pub created: DateTime<Utc>,
}

/// An item as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    /// Free-form label; unrelated to any alias.
    #[serde(default)]
    pub label: String,
    /// Type tag of the item (e.g. "data", "job").
    pub kind: String,
    pub created: DateTime<Utc>,
    /// Arbitrary key-value metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl ItemRecord {
    pub fn metadata(&self, key: &str) -> Option<&serde_json::Value> {
        self.metadata.get(key)
    }
}

/// Trait for backing stores of containers and items.
///
/// # Ordering
///
/// `containers_with_prefix` returns containers sorted by label.
/// `members` and `items_with_alias` return items in the order they were
/// added to the container.
pub trait Store {
    /// Look up a container by exact label within a kind.
    fn container(
        &self,
        label: &str,
        kind: &ContainerKind,
    ) -> Result<Option<ContainerRecord>, StoreError>;

    /// Look up a container by id.
    fn container_by_id(&self, id: ContainerId) -> Result<Option<ContainerRecord>, StoreError>;

    /// All containers of a kind whose label starts with `prefix`.
    ///
    /// An empty prefix matches every container of the kind.
    fn containers_with_prefix(
        &self,
        prefix: &str,
        kind: &ContainerKind,
    ) -> Result<Vec<ContainerRecord>, StoreError>;

    /// Create a container.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateContainer` if (label, kind) exists.
    fn create_container(
        &self,
        label: &str,
        kind: &ContainerKind,
    ) -> Result<ContainerRecord, StoreError>;

    /// Delete a container. Member items are left untouched.
    fn delete_container(&self, id: ContainerId) -> Result<(), StoreError>;

    /// Look up an item by id.
    fn item(&self, id: ItemId) -> Result<Option<ItemRecord>, StoreError>;

    /// Items that are members of a container.
    fn members(&self, container: ContainerId) -> Result<Vec<ItemRecord>, StoreError>;

    /// Members of `container` whose metadata object at `key` maps the
    /// container id to `alias`.
    fn items_with_alias(
        &self,
        container: ContainerId,
        key: &str,
        alias: &str,
    ) -> Result<Vec<ItemRecord>, StoreError>;

    /// Containers an item is a member of.
    fn memberships(&self, item: ItemId) -> Result<Vec<ContainerRecord>, StoreError>;

    /// Read one metadata key of an item.
    fn get_metadata(
        &self,
        item: ItemId,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError>;

    /// Atomically replace one metadata key of an item.
    fn set_metadata(
        &self,
        item: ItemId,
        key: &str,
        value: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Add items to a container. Existing members are ignored.
    fn add_members(&self, container: ContainerId, items: &[ItemId]) -> Result<(), StoreError>;
}
