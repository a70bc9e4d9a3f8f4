//! core::alias
//!
//! Alias metadata stored on items.
//!
//! # Layout
//!
//! Each item carries two metadata keys, both JSON objects keyed by container
//! id:
//!
//! - [`ALIAS_KEY`]: the active alias of the item inside each container
//! - [`DELETED_ALIAS_KEY`]: the most recently unlinked alias per container
//!
//! ```json
//! {
//!   "_path_alias": { "4be0...": "relax" },
//!   "_path_alias_deleted": { "4be0...": "relax_old" }
//! }
//! ```
//!
//! A value under either key that is not an object is treated as empty and
//! replaced on the next write.
//!
//! # Invariants
//!
//! - At most one history entry per (item, container); unlinking again
//!   overwrites it.
//! - Renaming rewrites the active entry in place and never touches history.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::core::types::{ContainerId, ItemId};
use crate::store::{ItemRecord, Store, StoreError};

/// Metadata key of the active alias map.
pub const ALIAS_KEY: &str = "_path_alias";

/// Metadata key of the deleted alias map.
pub const DELETED_ALIAS_KEY: &str = "_path_alias_deleted";

/// Which of the two alias maps to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasSlot {
    Active,
    Deleted,
}

impl AliasSlot {
    pub fn key(self) -> &'static str {
        match self {
            AliasSlot::Active => ALIAS_KEY,
            AliasSlot::Deleted => DELETED_ALIAS_KEY,
        }
    }
}

/// Decode an alias map, treating anything but an object of strings as empty.
fn decode(value: Option<Value>) -> BTreeMap<String, String> {
    match value {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn encode(map: BTreeMap<String, String>) -> Value {
    Value::Object(map.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
}

/// Read a whole alias map of an item.
pub fn alias_map(
    store: &dyn Store,
    item: ItemId,
    slot: AliasSlot,
) -> Result<BTreeMap<String, String>, StoreError> {
    Ok(decode(store.get_metadata(item, slot.key())?))
}

/// Read the alias map straight from an already fetched record.
pub fn record_alias_map(record: &ItemRecord, slot: AliasSlot) -> BTreeMap<String, String> {
    decode(record.metadata(slot.key()).cloned())
}

/// Alias of an item in a container, if any.
pub fn get_alias(
    store: &dyn Store,
    item: ItemId,
    container: ContainerId,
    slot: AliasSlot,
) -> Result<Option<String>, StoreError> {
    Ok(alias_map(store, item, slot)?.remove(&container.to_string()))
}

/// Alias of a fetched record in a container, if any.
pub fn record_alias(record: &ItemRecord, container: ContainerId, slot: AliasSlot) -> Option<String> {
    record_alias_map(record, slot).remove(&container.to_string())
}

/// Set the alias of an item in a container, replacing any previous value.
pub fn set_alias(
    store: &dyn Store,
    item: ItemId,
    container: ContainerId,
    alias: &str,
    slot: AliasSlot,
) -> Result<(), StoreError> {
    let mut map = alias_map(store, item, slot)?;
    map.insert(container.to_string(), alias.to_string());
    store.set_metadata(item, slot.key(), encode(map))
}

/// Remove the active alias of an item in a container.
///
/// When `keep_history` is set and an alias was removed, it is written to the
/// deleted slot, overwriting any earlier entry for the container. Returns
/// the removed alias.
pub fn delete_alias(
    store: &dyn Store,
    item: ItemId,
    container: ContainerId,
    keep_history: bool,
) -> Result<Option<String>, StoreError> {
    let mut map = alias_map(store, item, AliasSlot::Active)?;
    let previous = map.remove(&container.to_string());
    store.set_metadata(item, ALIAS_KEY, encode(map))?;

    if keep_history {
        if let Some(alias) = &previous {
            set_alias(store, item, container, alias, AliasSlot::Deleted)?;
        }
    }
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ContainerKind;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn setup() -> (MemoryStore, ContainerId, ItemId) {
        let store = MemoryStore::new();
        let group = store.create_container("g", &ContainerKind::default()).unwrap();
        let item = store.create_item("x", "data");
        (store, group.id, item.id)
    }

    #[test]
    fn set_then_get() {
        let (store, group, item) = setup();
        assert_eq!(get_alias(&store, item, group, AliasSlot::Active).unwrap(), None);
        set_alias(&store, item, group, "one", AliasSlot::Active).unwrap();
        assert_eq!(
            get_alias(&store, item, group, AliasSlot::Active).unwrap(),
            Some("one".into())
        );
    }

    #[test]
    fn aliases_are_scoped_per_container() {
        let (store, group, item) = setup();
        let other = ContainerId::new_v4();
        set_alias(&store, item, group, "one", AliasSlot::Active).unwrap();
        set_alias(&store, item, other, "two", AliasSlot::Active).unwrap();
        assert_eq!(alias_map(&store, item, AliasSlot::Active).unwrap().len(), 2);
    }

    #[test]
    fn delete_moves_to_history_and_overwrites() {
        let (store, group, item) = setup();
        set_alias(&store, item, group, "first", AliasSlot::Active).unwrap();
        assert_eq!(
            delete_alias(&store, item, group, true).unwrap(),
            Some("first".into())
        );
        set_alias(&store, item, group, "second", AliasSlot::Active).unwrap();
        delete_alias(&store, item, group, true).unwrap();

        assert_eq!(get_alias(&store, item, group, AliasSlot::Active).unwrap(), None);
        let history = alias_map(&store, item, AliasSlot::Deleted).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(&group.to_string()), Some(&"second".to_string()));
    }

    #[test]
    fn delete_without_history_leaves_history_alone() {
        let (store, group, item) = setup();
        set_alias(&store, item, group, "first", AliasSlot::Active).unwrap();
        delete_alias(&store, item, group, false).unwrap();
        assert!(alias_map(&store, item, AliasSlot::Deleted).unwrap().is_empty());
    }

    #[test]
    fn malformed_map_is_treated_as_empty() {
        let (store, group, item) = setup();
        store.set_metadata(item, ALIAS_KEY, json!("garbage")).unwrap();
        assert_eq!(get_alias(&store, item, group, AliasSlot::Active).unwrap(), None);
        set_alias(&store, item, group, "ok", AliasSlot::Active).unwrap();
        assert_eq!(
            store.get_metadata(item, ALIAS_KEY).unwrap(),
            Some(json!({ (group.to_string()): "ok" }))
        );
    }
}
