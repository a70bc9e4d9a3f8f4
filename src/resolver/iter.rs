//! resolver::iter
//!
//! Child enumeration and recursive walks.
//!
//! # Children
//!
//! `children()` issues at most three store queries for the whole level, no
//! matter how many children there are:
//!
//! 1. containers whose label starts with `path/` (all containers at root)
//! 2. the container at `path` itself
//! 3. the members of that container
//!
//! Labels and aliases are then folded into distinct next segments. In batch
//! mode the record that produced a child is attached to it when the record's
//! path is exactly the child's path, so resolving the child costs nothing.
//! Intermediate virtual segments never get an attachment.
//!
//! # Cursor safety
//!
//! The store's results are owned vectors, but the children are produced
//! lazily from them. A caller that mutates while iterating should take a
//! snapshot first with [`PathResolver::fast_children`].

use std::collections::{HashMap, HashSet};

use super::{Attached, PathKind, PathResolver, ResolveError};
use crate::core::alias::{self, AliasSlot};
use crate::core::path::{NodePath, DELIMITER};
use crate::store::{ContainerRecord, ItemRecord};

/// Lazy iterator over the immediate children of a path.
#[derive(Debug)]
pub struct Children<'s> {
    parent: PathResolver<'s>,
    containers: std::vec::IntoIter<ContainerRecord>,
    items: std::vec::IntoIter<String>,
    /// Alias to item, `None` when the alias is held by several items.
    by_alias: HashMap<String, Option<ItemRecord>>,
    own: Option<ContainerRecord>,
    seen: HashSet<String>,
}

impl<'s> Children<'s> {
    fn empty(parent: PathResolver<'s>) -> Self {
        Self {
            parent,
            containers: Vec::new().into_iter(),
            items: Vec::new().into_iter(),
            by_alias: HashMap::new(),
            own: None,
            seen: HashSet::new(),
        }
    }

    fn make_child(&self, segment: &str, attached: Option<Attached>) -> PathResolver<'s> {
        let mut segments = self.parent.path.segments().to_vec();
        segments.push(segment.to_string());
        let attached = if self.parent.mode.batch {
            attached
        } else {
            None
        };
        self.parent
            .derive(NodePath::from_segments(segments))
            .with_attached(attached)
    }

    fn item_attachment(&self, alias: &str) -> Option<Attached> {
        match (self.by_alias.get(alias), &self.own) {
            (Some(Some(record)), Some(own)) => Some(Attached::Item {
                record: record.clone(),
                parent: own.clone(),
            }),
            _ => None,
        }
    }

    fn next_container(&mut self) -> Option<PathResolver<'s>> {
        let depth = self.parent.path.depth();
        while let Some(record) = self.containers.next() {
            let segments: Vec<&str> = record.label.split(DELIMITER).collect();
            if segments.len() <= depth {
                continue;
            }
            let segment = segments[depth];
            if segment.is_empty() || segments.iter().any(|s| s.is_empty()) {
                tracing::warn!(label = %record.label, "invalid path encountered, skipping");
                continue;
            }
            if !self.seen.insert(segment.to_string()) {
                continue;
            }

            // An item bound under the same segment wins the path.
            let attached = if self.by_alias.contains_key(segment) {
                self.item_attachment(segment)
            } else if segments.len() == depth + 1 {
                Some(Attached::Container(record.clone()))
            } else {
                None
            };
            let segment = segment.to_string();
            return Some(self.make_child(&segment, attached));
        }
        None
    }

    fn next_item(&mut self) -> Option<PathResolver<'s>> {
        while let Some(alias) = self.items.next() {
            if !self.seen.insert(alias.clone()) {
                continue;
            }
            let attached = self.item_attachment(&alias);
            return Some(self.make_child(&alias, attached));
        }
        None
    }
}

impl<'s> Iterator for Children<'s> {
    type Item = PathResolver<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(child) = self.next_container() {
            return Some(child);
        }
        self.next_item()
    }
}

impl<'s> PathResolver<'s> {
    /// Immediate children of this path.
    ///
    /// Containers come first in label order, then item bindings in
    /// membership order. An item path has no children.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::NoDescendants` if the path is virtual and no
    /// container lies below it.
    pub fn children(&self) -> Result<Children<'s>, ResolveError> {
        let parent = self.derive(self.path.clone());
        if self.is_item()? {
            return Ok(Children::empty(parent));
        }

        let containers = self
            .store
            .containers_with_prefix(&self.path.descendant_prefix(), &self.kind)?;
        let own = self.container()?;
        if own.is_none() && containers.is_empty() {
            return Err(ResolveError::NoDescendants {
                path: self.path.clone(),
            });
        }

        let mut items = Vec::new();
        let mut by_alias: HashMap<String, Option<ItemRecord>> = HashMap::new();
        if let Some(own) = &own {
            for record in self.store.members(own.id)? {
                let alias = match alias::record_alias(&record, own.id, AliasSlot::Active) {
                    Some(alias) => alias,
                    None => continue,
                };
                if alias.is_empty() || alias.contains(DELIMITER) {
                    tracing::warn!(%alias, item = %record.id, "invalid alias encountered, skipping");
                    continue;
                }
                by_alias
                    .entry(alias.clone())
                    .and_modify(|slot| *slot = None)
                    .or_insert_with(|| Some(record.clone()));
                items.push(alias);
            }
        }

        let containers = if self.mode.only_items {
            Vec::new()
        } else {
            containers
        };

        tracing::debug!(
            path = %self.path,
            containers = containers.len(),
            items = items.len(),
            batch = self.mode.batch,
            "listing children"
        );

        Ok(Children {
            parent,
            containers: containers.into_iter(),
            items: items.into_iter(),
            by_alias,
            own,
            seen: HashSet::new(),
        })
    }

    /// Snapshot of the children, fetched in batch mode.
    ///
    /// Use this instead of `children()` when the store will be mutated
    /// while the children are being processed.
    pub fn fast_children(&mut self) -> Result<Vec<PathResolver<'s>>, ResolveError> {
        let guard = self.use_batch();
        let children = guard.children()?.collect();
        Ok(children)
    }

    /// Pre-order traversal of every descendant.
    ///
    /// Each call starts a fresh traversal against the current store state.
    /// With `include_virtual` unset, virtual paths are descended through but
    /// not yielded.
    pub fn walk(&self, include_virtual: bool) -> Walk<'s> {
        Walk {
            stack: Vec::new(),
            pending: Some(self.derive(self.path.clone())),
            include_virtual,
            done: false,
        }
    }
}

/// Lazy pre-order traversal produced by [`PathResolver::walk`].
pub struct Walk<'s> {
    stack: Vec<Children<'s>>,
    /// Node whose children are fetched on the next call.
    pending: Option<PathResolver<'s>>,
    include_virtual: bool,
    done: bool,
}

impl<'s> Iterator for Walk<'s> {
    type Item = Result<PathResolver<'s>, ResolveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(node) = self.pending.take() {
                match node.children() {
                    Ok(children) => self.stack.push(children),
                    Err(err) => {
                        self.done = true;
                        return Some(Err(err));
                    }
                }
            }

            let child = match self.stack.last_mut() {
                Some(top) => match top.next() {
                    Some(child) => child,
                    None => {
                        self.stack.pop();
                        continue;
                    }
                },
                None => {
                    self.done = true;
                    return None;
                }
            };

            let kind = match child.resolve() {
                Ok(kind) => kind,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            if kind != PathKind::Item {
                self.pending = Some(child.clone());
            }
            if self.include_virtual || kind != PathKind::Virtual {
                return Some(Ok(child));
            }
        }
    }
}
