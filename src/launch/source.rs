//! launch::source
//!
//! Where pending work comes from.

use crate::resolver::{PathKind, PathResolver, ResolveError};
use crate::store::ItemRecord;

/// A list of `(key, work)` pairs to launch, in launch order.
pub trait PendingSource {
    type Work;

    /// Read the current pending list.
    ///
    /// Called once when the loop starts and again on every later iteration
    /// when the source is dynamic.
    fn pending(&mut self) -> Result<Vec<(String, Self::Work)>, ResolveError>;
}

/// A fixed list of work.
impl<W: Clone> PendingSource for Vec<(String, W)> {
    type Work = W;

    fn pending(&mut self) -> Result<Vec<(String, W)>, ResolveError> {
        Ok(self.clone())
    }
}

/// Item children of a namespace, keyed by alias.
#[derive(Debug, Clone)]
pub struct NamespaceSource<'s> {
    root: PathResolver<'s>,
}

impl<'s> NamespaceSource<'s> {
    pub fn new(root: PathResolver<'s>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PathResolver<'s> {
        &self.root
    }
}

impl PendingSource for NamespaceSource<'_> {
    type Work = ItemRecord;

    fn pending(&mut self) -> Result<Vec<(String, ItemRecord)>, ResolveError> {
        let children = {
            let mut scan = self.root.only_items();
            scan.fast_children()?
        };
        let mut pending = Vec::with_capacity(children.len());
        for child in children {
            if child.resolve()? != PathKind::Item {
                continue;
            }
            if let Some(item) = child.item()? {
                pending.push((child.key().to_string(), item));
            }
        }
        Ok(pending)
    }
}
