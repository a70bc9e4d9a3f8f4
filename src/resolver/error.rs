//! resolver::error
//!
//! Resolution errors and the resolved path kind.

use thiserror::Error;

use crate::core::path::{NodePath, PathSyntaxError};
use crate::core::types::ItemId;
use crate::store::StoreError;

/// What a path resolves to at query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    /// No container and no bound item; descendants may still exist.
    Virtual,
    /// A container with exactly this label exists.
    Container,
    /// The parent is a container holding exactly one item under this alias.
    Item,
}

impl std::fmt::Display for PathKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathKind::Virtual => write!(f, "virtual"),
            PathKind::Container => write!(f, "a container"),
            PathKind::Item => write!(f, "an item"),
        }
    }
}

/// Errors from path resolution and alias mutation.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidPath(#[from] PathSyntaxError),

    #[error("invalid alias '{0}': an alias must be a single path segment")]
    InvalidAlias(String),

    /// The operation needs the path in a different state.
    #[error("path '{path}' is {actual}, expected {expected}")]
    WrongState {
        path: NodePath,
        expected: &'static str,
        actual: PathKind,
    },

    /// More than one item holds the same active alias in one container.
    ///
    /// This is corruption in the store and is never resolved by picking one.
    #[error("multiple items share the alias at '{path}': {}", join_ids(.items))]
    Ambiguous { path: NodePath, items: Vec<ItemId> },

    /// The alias is already bound to another item.
    #[error("path '{path}' is already bound to item {existing}")]
    AliasCollision { path: NodePath, existing: ItemId },

    /// The target path is a container, so no item can be bound there.
    #[error("path '{path}' is a container")]
    ContainerCollision { path: NodePath },

    /// The item already has a different alias in the container.
    #[error("item {item} already has alias '{existing}' in '{container}', cannot add it as '{alias}'")]
    ItemAlreadyAliased {
        item: ItemId,
        container: NodePath,
        alias: String,
        existing: String,
    },

    /// Children were requested under a virtual path with nothing below it.
    #[error("no containers found in path '{path}'")]
    NoDescendants { path: NodePath },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

fn join_ids(items: &[ItemId]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
