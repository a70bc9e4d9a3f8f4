//! Integration tests for path resolution and alias binding.
//!
//! These run against both store backends and check the behaviors callers
//! rely on: resolution kinds, binding round trips, collision handling with
//! history, and traversal order.

use tempfile::TempDir;

use pathbind::core::alias::{get_alias, AliasSlot};
use pathbind::core::types::ContainerKind;
use pathbind::resolver::{item_paths, PathKind, PathResolver, ResolveError};
use pathbind::store::{FileStore, MemoryStore, Store};

fn containers(store: &dyn Store, labels: &[&str]) {
    for label in labels {
        store
            .create_container(label, &ContainerKind::default())
            .unwrap();
    }
}

#[test]
fn every_path_has_exactly_one_kind() {
    let store = MemoryStore::new();
    containers(&store, &["a", "a/b", "a/c/d"]);
    let item = store.create_item("relax", "job");
    PathResolver::new(&store, "a/b")
        .unwrap()
        .add_item(item.id, "x", false)
        .unwrap();

    for (path, expected) in [
        ("a", PathKind::Container),
        ("a/b", PathKind::Container),
        ("a/c", PathKind::Virtual),
        ("a/c/d", PathKind::Container),
        ("a/b/x", PathKind::Item),
        ("a/b/y", PathKind::Virtual),
        ("zzz", PathKind::Virtual),
    ] {
        let resolver = PathResolver::new(&store, path).unwrap();
        let flags = [
            resolver.is_item().unwrap(),
            resolver.is_container().unwrap(),
            resolver.is_virtual().unwrap(),
        ];
        assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{path}");
        assert_eq!(resolver.resolve().unwrap(), expected, "{path}");
    }
}

#[test]
fn add_then_rename_round_trip() {
    let store = MemoryStore::new();
    let item = store.create_item("relax", "job");
    let mut group = PathResolver::new(&store, "g").unwrap();

    group.add_item(item.id, "x", false).unwrap();
    let mut x = group.child("x").unwrap();
    assert_eq!(x.item().unwrap().unwrap().id, item.id);

    let mut y = x.rename("y").unwrap();
    assert!(x.is_virtual().unwrap());
    assert_eq!(y.item().unwrap().unwrap().id, item.id);

    let back = y.rename("x").unwrap();
    assert_eq!(back.item().unwrap().unwrap().id, item.id);
    assert!(y.is_virtual().unwrap());
}

#[test]
fn unlink_of_virtual_path_is_a_state_error() {
    let store = MemoryStore::new();
    let item = store.create_item("relax", "job");
    let mut group = PathResolver::new(&store, "g").unwrap();
    group.add_item(item.id, "x", false).unwrap();

    let mut x = group.child("x").unwrap();
    assert_eq!(x.unlink(true).unwrap(), item.id);
    assert!(matches!(
        x.unlink(true),
        Err(ResolveError::WrongState {
            actual: PathKind::Virtual,
            ..
        })
    ));
    assert!(matches!(
        group.clone().unlink(true),
        Err(ResolveError::WrongState {
            actual: PathKind::Container,
            ..
        })
    ));
}

#[test]
fn forced_rebind_keeps_history_of_evicted_alias() {
    let store = MemoryStore::new();
    let first = store.create_item("first", "job");
    let second = store.create_item("second", "job");
    let mut group = PathResolver::new(&store, "g").unwrap();
    group.add_item(first.id, "x", false).unwrap();

    match group.add_item(second.id, "x", false) {
        Err(ResolveError::AliasCollision { existing, .. }) => assert_eq!(existing, first.id),
        other => panic!("expected collision, got {other:?}"),
    }
    assert_eq!(
        group.child("x").unwrap().item().unwrap().unwrap().id,
        first.id
    );

    group.add_item(second.id, "x", true).unwrap();
    let container = group.container().unwrap().unwrap();
    assert_eq!(
        group.child("x").unwrap().item().unwrap().unwrap().id,
        second.id
    );
    assert_eq!(
        get_alias(&store, first.id, container.id, AliasSlot::Active).unwrap(),
        None
    );
    assert_eq!(
        get_alias(&store, first.id, container.id, AliasSlot::Deleted).unwrap(),
        Some("x".to_string())
    );
}

#[test]
fn walk_without_virtual_paths() {
    let store = MemoryStore::new();
    containers(&store, &["a", "a/b", "a/c/d"]);
    let root = PathResolver::root(&store);
    let walked: Vec<String> = root
        .walk(false)
        .map(|p| p.unwrap().path().as_str())
        .collect();
    assert_eq!(walked, vec!["a", "a/b", "a/c/d"]);
}

#[test]
fn walk_yields_items_without_descending() {
    let store = MemoryStore::new();
    let item = store.create_item("relax", "job");
    let mut b = PathResolver::new(&store, "a/b").unwrap();
    b.add_item(item.id, "x", false).unwrap();

    let walked: Vec<(String, PathKind)> = PathResolver::root(&store)
        .walk(true)
        .map(|p| {
            let p = p.unwrap();
            (p.path().as_str(), p.resolve().unwrap())
        })
        .collect();
    assert_eq!(
        walked,
        vec![
            ("a".to_string(), PathKind::Virtual),
            ("a/b".to_string(), PathKind::Container),
            ("a/b/x".to_string(), PathKind::Item),
        ]
    );
}

#[test]
fn file_store_persists_bindings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let item_id = {
        let store = FileStore::open(&path).unwrap();
        let item = store.create_item("relax", "job").unwrap();
        let mut group = PathResolver::new(&store, "project/runs").unwrap();
        group.add_item(item.id, "relax", false).unwrap();
        item.id
    };

    let store = FileStore::open(&path).unwrap();
    let resolved = PathResolver::new(&store, "project/runs/relax").unwrap();
    assert_eq!(resolved.item().unwrap().unwrap().id, item_id);
    assert_eq!(
        item_paths(&store, item_id)
            .unwrap()
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>(),
        vec!["project/runs/relax"]
    );
    assert!(PathResolver::new(&store, "project")
        .unwrap()
        .is_virtual()
        .unwrap());
}

#[test]
fn deleting_a_container_orphans_aliases() {
    let store = MemoryStore::new();
    let item = store.create_item("relax", "job");
    let mut group = PathResolver::new(&store, "g").unwrap();
    group.add_item(item.id, "x", false).unwrap();

    group.delete_container().unwrap();
    assert!(PathResolver::new(&store, "g/x").unwrap().is_virtual().unwrap());
    assert!(item_paths(&store, item.id).unwrap().is_empty());
    assert!(store.item(item.id).unwrap().is_some());
}

#[test]
fn containers_of_another_kind_are_invisible() {
    let store = MemoryStore::new();
    let other = ContainerKind::new("archive").unwrap();
    store.create_container("a/b", &other).unwrap();

    let default_root = PathResolver::root(&store);
    assert!(matches!(
        default_root.children().map(|c| c.count()),
        Err(ResolveError::NoDescendants { .. })
    ));

    let archive_root = PathResolver::root(&store).with_kind(other);
    let keys: Vec<String> = archive_root
        .walk(true)
        .map(|p| p.unwrap().path().as_str())
        .collect();
    assert_eq!(keys, vec!["a", "a/b"]);
}
