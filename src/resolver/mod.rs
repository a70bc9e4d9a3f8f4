//! resolver
//!
//! Alias-path resolution over a flat store of containers and items.
//!
//! # Model
//!
//! A [`PathResolver`] is a value-type coordinate: a store reference, a
//! [`NodePath`], the container kind it resolves within, and an iteration
//! mode. It holds no tree. Every question about the path is answered by
//! querying the store when asked, so a resolver never goes stale unless a
//! record was attached to it in batch mode.
//!
//! A path resolves to exactly one [`PathKind`]:
//!
//! - `Item` if the parent path is a container holding exactly one item whose
//!   active alias for that container equals the last segment
//! - `Container` if a container with exactly this label exists
//! - `Virtual` otherwise
//!
//! When both an item alias and a container label match, the path is an
//! item; the container is still reachable through [`PathResolver::container`]
//! and flagged by [`PathResolver::is_ambiguous`].
//!
//! # Modules
//!
//! - [`error`] - `ResolveError` and `PathKind`
//! - [`mode`] - `IterMode` and the scoped `ModeGuard`
//! - [`iter`] - `Children` and `Walk` iterators, batch attachment
//! - [`mutate`] - add, rename, unlink and container lifecycle
//!
//! # Example
//!
//! ```
//! use pathbind::core::types::ContainerKind;
//! use pathbind::resolver::{PathKind, PathResolver};
//! use pathbind::store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//! let item = store.create_item("relax", "job");
//!
//! let mut group = PathResolver::new(&store, "project/runs").unwrap();
//! group.add_item(item.id, "relax", false).unwrap();
//!
//! let path = PathResolver::new(&store, "project/runs/relax").unwrap();
//! assert_eq!(path.resolve().unwrap(), PathKind::Item);
//! assert_eq!(group.resolve().unwrap(), PathKind::Container);
//! assert_eq!(PathResolver::new(&store, "project").unwrap().resolve().unwrap(), PathKind::Virtual);
//! ```

pub mod error;
pub mod iter;
pub mod mode;
pub mod mutate;

pub use error::{PathKind, ResolveError};
pub use iter::{Children, Walk};
pub use mode::{IterMode, ModeGuard};

use crate::core::alias::{self, AliasSlot, ALIAS_KEY};
use crate::core::path::NodePath;
use crate::core::types::{ContainerKind, ItemId};
use crate::store::{ContainerRecord, ItemRecord, Store};

/// A record fetched alongside a child in batch mode.
#[derive(Debug, Clone)]
pub(crate) enum Attached {
    Container(ContainerRecord),
    Item {
        record: ItemRecord,
        parent: ContainerRecord,
    },
}

/// A path coordinate over a [`Store`].
#[derive(Clone)]
pub struct PathResolver<'s> {
    store: &'s dyn Store,
    path: NodePath,
    kind: ContainerKind,
    mode: IterMode,
    cache: Option<Attached>,
}

impl std::fmt::Debug for PathResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver")
            .field("path", &self.path.as_str())
            .field("kind", &self.kind)
            .field("mode", &self.mode)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl PartialEq for PathResolver<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.kind == other.kind
    }
}

impl Eq for PathResolver<'_> {}

impl std::fmt::Display for PathResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl<'s> PathResolver<'s> {
    /// Resolver for the root path using the default container kind.
    pub fn root(store: &'s dyn Store) -> Self {
        Self::at(store, NodePath::root())
    }

    /// Resolver for a textual path using the default container kind.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidPath` if the path is malformed.
    pub fn new(store: &'s dyn Store, path: &str) -> Result<Self, ResolveError> {
        Ok(Self::at(store, NodePath::parse(path)?))
    }

    /// Resolver for an already parsed path.
    pub fn at(store: &'s dyn Store, path: NodePath) -> Self {
        Self {
            store,
            path,
            kind: ContainerKind::default(),
            mode: IterMode::default(),
            cache: None,
        }
    }

    /// Resolve containers of a different kind.
    pub fn with_kind(mut self, kind: ContainerKind) -> Self {
        self.kind = kind;
        self.cache = None;
        self
    }

    pub fn with_mode(mut self, mode: IterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolver for a related path sharing store, kind and mode.
    fn derive(&self, path: NodePath) -> Self {
        Self {
            store: self.store,
            path,
            kind: self.kind.clone(),
            mode: self.mode,
            cache: None,
        }
    }

    pub(crate) fn with_attached(mut self, attached: Option<Attached>) -> Self {
        self.cache = attached;
        self
    }

    pub fn store(&self) -> &'s dyn Store {
        self.store
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// Trailing path segment (empty for the root).
    pub fn key(&self) -> &str {
        self.path.key()
    }

    pub fn container_kind(&self) -> &ContainerKind {
        &self.kind
    }

    pub fn mode(&self) -> IterMode {
        self.mode
    }

    pub(crate) fn set_mode(&mut self, mode: IterMode) {
        self.mode = mode;
    }

    /// Switch to `mode` until the returned guard is dropped.
    pub fn scoped(&mut self, mode: IterMode) -> ModeGuard<'_, 's> {
        ModeGuard::new(self, mode)
    }

    /// Enable batch attachment until the guard is dropped.
    pub fn use_batch(&mut self) -> ModeGuard<'_, 's> {
        let mode = self.mode.with_batch(true);
        self.scoped(mode)
    }

    /// Disable batch attachment until the guard is dropped.
    pub fn no_batch(&mut self) -> ModeGuard<'_, 's> {
        let mode = self.mode.with_batch(false);
        self.scoped(mode)
    }

    /// Restrict children to item bindings until the guard is dropped.
    pub fn only_items(&mut self) -> ModeGuard<'_, 's> {
        let mode = self.mode.with_only_items(true);
        self.scoped(mode)
    }

    /// Whether a batch-attached record is currently held.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Drop any attached record so the next access queries the store.
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// A descendant path, `rest` being one or more segments.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidPath` if `rest` is empty or malformed.
    pub fn child(&self, rest: &str) -> Result<Self, ResolveError> {
        Ok(self.derive(self.path.join(rest)?))
    }

    /// The parent path, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        self.path.parent().map(|p| self.derive(p))
    }

    /// The container whose label is exactly this path, if any.
    ///
    /// Queried independently of whether the path resolves to an item.
    pub fn container(&self) -> Result<Option<ContainerRecord>, ResolveError> {
        if self.path.is_root() {
            return Ok(None);
        }
        if let Some(Attached::Container(record)) = &self.cache {
            return Ok(Some(record.clone()));
        }
        Ok(self.store.container(&self.path.as_str(), &self.kind)?)
    }

    /// The container at the parent path, if any.
    pub fn parent_container(&self) -> Result<Option<ContainerRecord>, ResolveError> {
        if let Some(Attached::Item { parent, .. }) = &self.cache {
            return Ok(Some(parent.clone()));
        }
        match self.parent() {
            Some(parent) => parent.container(),
            None => Ok(None),
        }
    }

    /// Every item bound under this path's alias in the parent container.
    fn bound_items(&self) -> Result<Vec<ItemRecord>, ResolveError> {
        let parent = match self.parent_container()? {
            Some(parent) => parent,
            None => return Ok(Vec::new()),
        };
        Ok(self
            .store
            .items_with_alias(parent.id, ALIAS_KEY, self.path.key())?)
    }

    /// The item bound at this path, if any.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::Ambiguous` if more than one item is bound.
    pub fn item(&self) -> Result<Option<ItemRecord>, ResolveError> {
        if let Some(Attached::Item { record, .. }) = &self.cache {
            return Ok(Some(record.clone()));
        }
        let mut items = self.bound_items()?;
        match items.len() {
            0 => Ok(None),
            1 => Ok(items.pop()),
            _ => Err(ResolveError::Ambiguous {
                path: self.path.clone(),
                items: items.into_iter().map(|i| i.id).collect(),
            }),
        }
    }

    /// Resolve the path against the current store state.
    pub fn resolve(&self) -> Result<PathKind, ResolveError> {
        match &self.cache {
            Some(Attached::Item { .. }) => return Ok(PathKind::Item),
            Some(Attached::Container(_)) => return Ok(PathKind::Container),
            None => {}
        }
        if self.item()?.is_some() {
            return Ok(PathKind::Item);
        }
        if self.container()?.is_some() {
            return Ok(PathKind::Container);
        }
        Ok(PathKind::Virtual)
    }

    pub fn is_item(&self) -> Result<bool, ResolveError> {
        Ok(self.resolve()? == PathKind::Item)
    }

    pub fn is_container(&self) -> Result<bool, ResolveError> {
        Ok(self.resolve()? == PathKind::Container)
    }

    pub fn is_virtual(&self) -> Result<bool, ResolveError> {
        Ok(self.resolve()? == PathKind::Virtual)
    }

    /// Whether an item alias and a container label both claim this path.
    pub fn is_ambiguous(&self) -> Result<bool, ResolveError> {
        Ok(self.item()?.is_some() && self.container()?.is_some())
    }

    /// Identifier of whatever the path resolves to.
    pub fn uuid(&self) -> Result<Option<String>, ResolveError> {
        Ok(match self.resolve()? {
            PathKind::Item => self.item()?.map(|i| i.id.to_string()),
            PathKind::Container => self.container()?.map(|c| c.id.to_string()),
            PathKind::Virtual => None,
        })
    }

    /// Fail with `WrongState` unless the path resolves to `wanted`.
    pub(crate) fn require(&self, wanted: PathKind) -> Result<(), ResolveError> {
        let actual = self.resolve()?;
        if actual != wanted {
            let expected = match wanted {
                PathKind::Item => "an item",
                PathKind::Container => "a container",
                PathKind::Virtual => "virtual",
            };
            return Err(ResolveError::WrongState {
                path: self.path.clone(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Aliases of the item children bound directly in this container.
    ///
    /// Non-container paths have none.
    pub fn list_items(&self) -> Result<Vec<String>, ResolveError> {
        if !self.is_container()? {
            return Ok(Vec::new());
        }
        let scan = self
            .derive(self.path.clone())
            .with_mode(IterMode::batch().with_only_items(true));
        let mut keys = Vec::new();
        for child in scan.children()? {
            if child.is_item()? {
                keys.push(child.key().to_string());
            }
        }
        Ok(keys)
    }

    /// Members of this container that carry no active alias for it.
    pub fn list_unaliased_items(&self) -> Result<Vec<ItemRecord>, ResolveError> {
        if !self.is_container()? {
            return Ok(Vec::new());
        }
        let container = match self.container()? {
            Some(container) => container,
            None => return Ok(Vec::new()),
        };
        Ok(self
            .store
            .members(container.id)?
            .into_iter()
            .filter(|item| alias::record_alias(item, container.id, AliasSlot::Active).is_none())
            .collect())
    }
}

/// Every path under which an item is currently bound.
///
/// Entries whose container no longer exists are skipped.
pub fn item_paths(store: &dyn Store, item: ItemId) -> Result<Vec<NodePath>, ResolveError> {
    let mut paths = Vec::new();
    for (container_id, alias) in alias::alias_map(store, item, AliasSlot::Active)? {
        let container = match crate::core::types::ContainerId::parse(&container_id) {
            Ok(id) => store.container_by_id(id)?,
            Err(_) => None,
        };
        match container {
            Some(container) => {
                let path = NodePath::parse(&container.label)?.join(&alias)?;
                paths.push(path);
            }
            None => {
                tracing::debug!(%item, container = %container_id, "skipping alias of missing container");
            }
        }
    }
    paths.sort();
    Ok(paths)
}
