//! tree::decorate
//!
//! Label decorators for tree rendering.
//!
//! A decorator inspects one path and either returns a suffix or `None` when
//! it does not apply. Decorators never fail: a resolution error inside one
//! is treated as "does not apply".

use crate::resolver::{PathKind, PathResolver};
use crate::store::ItemRecord;

/// A label decorator.
pub type Decorator = Box<dyn Fn(&PathResolver<'_>) -> Option<String>>;

/// Names accepted by [`decorator_by_name`].
pub const DECORATOR_NAMES: &[&str] = &[
    "item",
    "container",
    "uuid",
    "uuid_first_12",
    "label",
    "container_names",
];

fn kind_of(path: &PathResolver<'_>) -> Option<PathKind> {
    path.resolve().ok()
}

fn item_of(path: &PathResolver<'_>) -> Option<ItemRecord> {
    if kind_of(path)? != PathKind::Item {
        return None;
    }
    path.item().ok().flatten()
}

/// `*` on item paths.
pub fn decorate_item() -> Decorator {
    Box::new(|path| (kind_of(path)? == PathKind::Item).then(|| "*".to_string()))
}

/// `*` on container paths.
pub fn decorate_container() -> Decorator {
    Box::new(|path| (kind_of(path)? == PathKind::Container).then(|| "*".to_string()))
}

/// First 12 characters of the item or container id.
pub fn decorate_with_uuid() -> Decorator {
    Box::new(|path| match kind_of(path)? {
        PathKind::Item => item_of(path).map(|item| item.id.short(12)),
        PathKind::Container => path.container().ok().flatten().map(|c| c.id.short(12)),
        PathKind::Virtual => None,
    })
}

/// First `n` characters of the item id. Containers are not decorated.
pub fn decorate_with_uuid_first_n(n: usize) -> Decorator {
    Box::new(move |path| item_of(path).map(|item| item.id.short(n)))
}

/// The store label of the item or container.
pub fn decorate_with_label() -> Decorator {
    Box::new(|path| match kind_of(path)? {
        PathKind::Item => item_of(path).map(|item| item.label),
        PathKind::Container => path.container().ok().flatten().map(|c| c.label),
        PathKind::Virtual => None,
    })
}

/// Labels of every container the item belongs to.
pub fn decorate_with_container_names() -> Decorator {
    Box::new(|path| {
        let item = item_of(path)?;
        let containers = path.store().memberships(item.id).ok()?;
        let labels: Vec<String> = containers.into_iter().map(|c| c.label).collect();
        Some(labels.join(", "))
    })
}

/// `[finished]` or `[running]` on items, according to `finished`.
pub fn decorate_with_status<F>(finished: F) -> Decorator
where
    F: Fn(&ItemRecord) -> bool + 'static,
{
    Box::new(move |path| {
        let item = item_of(path)?;
        Some(if finished(&item) {
            "[finished]".to_string()
        } else {
            "[running]".to_string()
        })
    })
}

/// Look up a built-in decorator by name.
pub fn decorator_by_name(name: &str) -> Option<Decorator> {
    match name {
        "item" => Some(decorate_item()),
        "container" => Some(decorate_container()),
        "uuid" => Some(decorate_with_uuid()),
        "uuid_first_12" => Some(decorate_with_uuid_first_n(12)),
        "label" => Some(decorate_with_label()),
        "container_names" => Some(decorate_with_container_names()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn every_listed_name_resolves() {
        for name in DECORATOR_NAMES {
            assert!(decorator_by_name(name).is_some(), "{name}");
        }
        assert!(decorator_by_name("pk").is_none());
    }

    #[test]
    fn markers_follow_kind() {
        let store = MemoryStore::new();
        let item = store.create_item("relax", "job");
        let mut group = PathResolver::new(&store, "g").unwrap();
        group.add_item(item.id, "x", false).unwrap();
        let x = group.child("x").unwrap();

        assert_eq!(decorate_item()(&x), Some("*".into()));
        assert_eq!(decorate_item()(&group), None);
        assert_eq!(decorate_container()(&group), Some("*".into()));
        assert_eq!(decorate_container()(&x), None);
    }

    #[test]
    fn ids_labels_and_memberships() {
        let store = MemoryStore::new();
        let item = store.create_item("relax", "job");
        let mut one = PathResolver::new(&store, "one").unwrap();
        one.add_item(item.id, "x", false).unwrap();
        PathResolver::new(&store, "two")
            .unwrap()
            .add_item(item.id, "y", false)
            .unwrap();
        let x = one.child("x").unwrap();

        assert_eq!(decorate_with_uuid()(&x), Some(item.id.short(12)));
        assert_eq!(decorate_with_uuid_first_n(4)(&x).unwrap().len(), 4);
        assert_eq!(decorate_with_uuid_first_n(4)(&one), None);
        assert_eq!(decorate_with_label()(&x), Some("relax".into()));
        assert_eq!(decorate_with_label()(&one), Some("one".into()));
        assert_eq!(decorate_with_container_names()(&x), Some("one, two".into()));
    }

    #[test]
    fn status_uses_predicate() {
        let store = MemoryStore::new();
        let item = store.create_item("relax", "job");
        let mut group = PathResolver::new(&store, "g").unwrap();
        group.add_item(item.id, "x", false).unwrap();
        let x = group.child("x").unwrap();

        let done = decorate_with_status(|record| record.label == "relax");
        let pending = decorate_with_status(|_| false);
        assert_eq!(done(&x), Some("[finished]".into()));
        assert_eq!(pending(&x), Some("[running]".into()));
        assert_eq!(done(&group), None);
    }
}
