//! resolver::mutate
//!
//! Alias binding and container lifecycle.
//!
//! # Integrity Contract
//!
//! - Every check runs before the first write, so a rejected call leaves the
//!   store untouched (a virtual container is only created once the binding
//!   is known to be valid).
//! - An evicted binding is unlinked with history before the new alias is
//!   written.
//! - A mutation clears the batch-attached record of the resolver it ran on.
//!
//! # Example
//!
//! ```
//! use pathbind::resolver::{PathResolver, ResolveError};
//! use pathbind::store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let first = store.create_item("a", "data");
//! let second = store.create_item("b", "data");
//!
//! let mut group = PathResolver::new(&store, "g").unwrap();
//! group.add_item(first.id, "x", false).unwrap();
//!
//! let err = group.add_item(second.id, "x", false).unwrap_err();
//! assert!(matches!(err, ResolveError::AliasCollision { .. }));
//!
//! group.add_item(second.id, "x", true).unwrap();
//! assert_eq!(group.child("x").unwrap().item().unwrap().unwrap().id, second.id);
//! ```

use std::collections::HashMap;

use super::{PathKind, PathResolver, ResolveError};
use crate::core::alias::{self, AliasSlot};
use crate::core::path::NodePath;
use crate::core::types::ItemId;
use crate::store::{ContainerRecord, StoreError};

/// Check that an alias is exactly one valid path segment.
fn validate_alias(alias: &str) -> Result<(), ResolveError> {
    match NodePath::parse(alias) {
        Ok(path) if path.depth() == 1 => Ok(()),
        _ => Err(ResolveError::InvalidAlias(alias.to_string())),
    }
}

impl<'s> PathResolver<'s> {
    fn require_not_item(&self) -> Result<(), ResolveError> {
        if self.is_item()? {
            return Err(ResolveError::WrongState {
                path: self.path.clone(),
                expected: "a container or virtual path",
                actual: PathKind::Item,
            });
        }
        Ok(())
    }

    fn require_item(&self, item: ItemId) -> Result<(), ResolveError> {
        if self.store.item(item)?.is_none() {
            return Err(StoreError::ItemNotFound(item).into());
        }
        Ok(())
    }

    /// Return the container at this path, creating it if the path is virtual.
    ///
    /// The flag is `true` when the container was created by this call.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` for the root and for item paths.
    pub fn get_or_create_container(&mut self) -> Result<(ContainerRecord, bool), ResolveError> {
        if self.path.is_root() {
            return Err(ResolveError::WrongState {
                path: self.path.clone(),
                expected: "a non-root path",
                actual: PathKind::Virtual,
            });
        }
        self.require_not_item()?;
        if let Some(existing) = self.container()? {
            return Ok((existing, false));
        }
        let created = self.store.create_container(&self.path.as_str(), &self.kind)?;
        tracing::debug!(path = %self.path, id = %created.id, "created container");
        self.clear_cache();
        Ok((created, true))
    }

    /// Delete the container at this path. Member items are left in the store.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` if no container has this exact label.
    pub fn delete_container(&mut self) -> Result<(), ResolveError> {
        let container = self.container()?.ok_or_else(|| ResolveError::WrongState {
            path: self.path.clone(),
            expected: "a container",
            actual: PathKind::Virtual,
        })?;
        self.store.delete_container(container.id)?;
        tracing::debug!(path = %self.path, id = %container.id, "deleted container");
        self.clear_cache();
        Ok(())
    }

    /// Bind `item` under this path as `alias`.
    ///
    /// Creates the container if the path is virtual and adds the item to it.
    /// Binding the same item under the same alias again is a no-op.
    ///
    /// # Errors
    ///
    /// - `WrongState` if this path is an item
    /// - `Store(ItemNotFound)` if `item` does not exist
    /// - `ContainerCollision` if `path/alias` is a container
    /// - `AliasCollision` if `path/alias` is bound to another item and
    ///   `force` is unset; with `force` that binding is unlinked first
    /// - `ItemAlreadyAliased` if the item has a different alias here and
    ///   `force` is unset; with `force` the old alias is replaced
    pub fn add_item(&mut self, item: ItemId, alias: &str, force: bool) -> Result<(), ResolveError> {
        validate_alias(alias)?;
        self.require_not_item()?;
        self.require_item(item)?;

        let mut target = self.child(alias)?;
        let evict = match target.resolve()? {
            PathKind::Container => {
                return Err(ResolveError::ContainerCollision { path: target.path });
            }
            PathKind::Item => match target.item()? {
                Some(bound) if bound.id != item => {
                    if !force {
                        return Err(ResolveError::AliasCollision {
                            path: target.path,
                            existing: bound.id,
                        });
                    }
                    true
                }
                _ => false,
            },
            PathKind::Virtual => false,
        };

        if let Some(container) = self.container()? {
            if let Some(existing) =
                alias::get_alias(self.store, item, container.id, AliasSlot::Active)?
            {
                if existing != alias {
                    if !force {
                        return Err(ResolveError::ItemAlreadyAliased {
                            item,
                            container: self.path.clone(),
                            alias: alias.to_string(),
                            existing,
                        });
                    }
                    tracing::warn!(%item, %existing, new = alias, "overwriting alias");
                }
            }
        }

        if evict {
            tracing::warn!(path = %target.path, "unsetting alias of the existing item");
            target.unlink(true)?;
        }

        let (container, _) = self.get_or_create_container()?;
        alias::set_alias(self.store, item, container.id, alias, AliasSlot::Active)?;
        self.store.add_members(container.id, &[item])?;
        tracing::debug!(path = %target.path, %item, "bound item");
        self.clear_cache();
        Ok(())
    }

    /// Bind several items at once.
    ///
    /// Every alias is checked against the current children before anything
    /// is written. Aliases already bound are rebound only with `force`.
    ///
    /// # Errors
    ///
    /// - `InvalidAlias` for malformed aliases
    /// - `Store(ItemNotFound)` if any item does not exist
    /// - `AliasCollision` for an alias repeated within `bindings`, or one
    ///   already bound when `force` is unset
    /// - `ContainerCollision` if an alias names a child container
    /// - `ItemAlreadyAliased` if an item has a different alias here and
    ///   `force` is unset
    pub fn add_items(&mut self, bindings: &[(String, ItemId)], force: bool) -> Result<(), ResolveError> {
        self.require_not_item()?;

        let mut requested: HashMap<&str, ItemId> = HashMap::new();
        for (alias, item) in bindings {
            validate_alias(alias)?;
            if let Some(previous) = requested.insert(alias.as_str(), *item) {
                return Err(ResolveError::AliasCollision {
                    path: self.path.join(alias)?,
                    existing: previous,
                });
            }
            self.require_item(*item)?;
        }

        let existing: HashMap<String, PathResolver<'s>> = match self.fast_children() {
            Ok(children) => children
                .into_iter()
                .map(|c| (c.key().to_string(), c))
                .collect(),
            Err(ResolveError::NoDescendants { .. }) => HashMap::new(),
            Err(err) => return Err(err),
        };

        let mut evictions = Vec::new();
        for (alias, item) in bindings {
            let Some(child) = existing.get(alias.as_str()) else {
                continue;
            };
            match child.resolve()? {
                PathKind::Container => {
                    return Err(ResolveError::ContainerCollision {
                        path: child.path.clone(),
                    })
                }
                PathKind::Item => {
                    let bound = child.item()?;
                    if bound.as_ref().map(|b| b.id) == Some(*item) {
                        continue;
                    }
                    if !force {
                        return Err(ResolveError::AliasCollision {
                            path: child.path.clone(),
                            existing: bound.map(|b| b.id).unwrap_or(*item),
                        });
                    }
                    evictions.push(child.clone());
                }
                PathKind::Virtual => {}
            }
        }

        if let (Some(container), false) = (self.container()?, force) {
            for (alias, item) in bindings {
                if let Some(existing) =
                    alias::get_alias(self.store, *item, container.id, AliasSlot::Active)?
                {
                    if existing != *alias {
                        return Err(ResolveError::ItemAlreadyAliased {
                            item: *item,
                            container: self.path.clone(),
                            alias: alias.clone(),
                            existing,
                        });
                    }
                }
            }
        }

        let (container, _) = self.get_or_create_container()?;
        for mut evicted in evictions {
            tracing::warn!(path = %evicted.path, "unsetting alias of the existing item");
            evicted.unlink(true)?;
        }
        for (alias, item) in bindings {
            alias::set_alias(self.store, *item, container.id, alias, AliasSlot::Active)?;
        }
        let ids: Vec<ItemId> = bindings.iter().map(|(_, id)| *id).collect();
        self.store.add_members(container.id, &ids)?;
        tracing::debug!(path = %self.path, count = ids.len(), "bound items");
        self.clear_cache();
        Ok(())
    }

    /// Change the alias of the item at this path.
    ///
    /// The alias is rewritten in place; no history entry is made. Returns a
    /// resolver for the new path.
    ///
    /// # Errors
    ///
    /// - `WrongState` unless this path is an item
    /// - `AliasCollision` / `ContainerCollision` if the new sibling path is
    ///   not virtual
    pub fn rename(&mut self, new_alias: &str) -> Result<PathResolver<'s>, ResolveError> {
        validate_alias(new_alias)?;
        self.require(PathKind::Item)?;

        let item = self.item()?.ok_or_else(|| ResolveError::WrongState {
            path: self.path.clone(),
            expected: "an item",
            actual: PathKind::Virtual,
        })?;
        let container = self.parent_container()?.ok_or_else(|| ResolveError::WrongState {
            path: self.path.clone(),
            expected: "an item",
            actual: PathKind::Virtual,
        })?;

        let sibling = match self.parent() {
            Some(parent) => parent.child(new_alias)?,
            None => return Err(ResolveError::InvalidAlias(new_alias.to_string())),
        };
        match sibling.resolve()? {
            PathKind::Virtual => {}
            PathKind::Container => {
                return Err(ResolveError::ContainerCollision { path: sibling.path });
            }
            PathKind::Item => {
                let existing = sibling.item()?.map(|i| i.id).unwrap_or(item.id);
                return Err(ResolveError::AliasCollision {
                    path: sibling.path,
                    existing,
                });
            }
        }

        alias::set_alias(self.store, item.id, container.id, new_alias, AliasSlot::Active)?;
        tracing::debug!(from = %self.path, to = %sibling.path, "renamed alias");
        self.clear_cache();
        Ok(sibling)
    }

    /// Remove the alias of the item at this path.
    ///
    /// The item stays a member of the container. With `keep_history` the
    /// removed alias replaces the container's entry in the item's history.
    /// Returns the unlinked item.
    ///
    /// # Errors
    ///
    /// Returns `WrongState` unless this path is an item.
    pub fn unlink(&mut self, keep_history: bool) -> Result<ItemId, ResolveError> {
        self.require(PathKind::Item)?;
        let not_item = || ResolveError::WrongState {
            path: self.path.clone(),
            expected: "an item",
            actual: PathKind::Virtual,
        };
        let item = self.item()?.ok_or_else(not_item)?;
        let container = self.parent_container()?.ok_or_else(not_item)?;

        alias::delete_alias(self.store, item.id, container.id, keep_history)?;
        tracing::debug!(path = %self.path, item = %item.id, keep_history, "unlinked item");
        self.clear_cache();
        Ok(item.id)
    }
}
