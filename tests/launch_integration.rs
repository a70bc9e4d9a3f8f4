//! Integration tests for the launch loop against a file store.

use std::cell::Cell;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use pathbind::launch::{
    BoxError, LaunchConfig, LaunchController, LaunchState, Launched, NamespaceSource,
};
use pathbind::resolver::PathResolver;
use pathbind::store::{FileStore, ItemRecord, Store};

fn finished(item: &ItemRecord) -> bool {
    item.metadata("state") == Some(&json!("finished"))
}

fn config(max_concurrent: usize) -> LaunchConfig {
    LaunchConfig {
        max_concurrent,
        sleep: Duration::ZERO,
        ..LaunchConfig::default()
    }
}

fn mark_finished(store: &FileStore, path: &str) {
    let item = PathResolver::new(store, path)
        .unwrap()
        .item()
        .unwrap()
        .unwrap();
    store
        .set_metadata(item.id, "state", json!("finished"))
        .unwrap();
}

#[test]
fn namespace_source_into_target_with_restart() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("store.json");
    let log = dir.path().join("launch.log");
    let store = FileStore::open(&store_path).unwrap();

    let mut inputs = PathResolver::new(&store, "inputs").unwrap();
    for key in ["k1", "k2", "k3"] {
        let item = store.create_item(key, "data").unwrap();
        inputs.add_item(item.id, key, false).unwrap();
    }

    let calls = Cell::new(0);
    let launch = |input: &ItemRecord, key: &str| -> Result<Launched, BoxError> {
        calls.set(calls.get() + 1);
        let item = store.create_item(&format!("run-{}", input.label), "job")?;
        Ok(Launched {
            item: item.id,
            key: key.to_string(),
        })
    };

    let mut controller = LaunchController::new(
        PathResolver::new(&store, "runs").unwrap(),
        NamespaceSource::new(inputs.clone()),
        launch,
        finished,
        LaunchConfig {
            logfile: Some(log.clone()),
            ..config(2)
        },
    )
    .unwrap();

    let first = controller.step().unwrap();
    assert_eq!(first.launched.len(), 2);
    assert_eq!(calls.get(), 2);

    mark_finished(&store, "runs/k1");
    let second = controller.step().unwrap();
    assert_eq!(second.running, 1);
    assert_eq!(second.launched[0].key, "k3");
    drop(controller);

    // A fresh controller over the reopened store launches nothing new.
    let reopened = FileStore::open(&store_path).unwrap();
    let mut restarted = LaunchController::new(
        PathResolver::new(&reopened, "runs").unwrap(),
        NamespaceSource::new(PathResolver::new(&reopened, "inputs").unwrap()),
        |_: &ItemRecord, key: &str| -> Result<Launched, BoxError> {
            Err(format!("{key} was launched twice").into())
        },
        |_: &ItemRecord| true,
        config(2),
    )
    .unwrap();
    assert!(restarted.run().unwrap().is_empty());
    assert_eq!(restarted.state(), LaunchState::Stopped);
    assert_eq!(calls.get(), 3);

    let logged = std::fs::read_to_string(&log).unwrap();
    assert!(logged.contains("Total number of running jobs: 0"));
    assert!(logged.contains("Launched 2 jobs"));
}

#[test]
fn forced_launch_rebinds_existing_key() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("store.json")).unwrap();

    let stale = store.create_item("stale", "job").unwrap();
    PathResolver::new(&store, "runs")
        .unwrap()
        .add_item(stale.id, "old", false)
        .unwrap();

    let mut controller = LaunchController::new(
        PathResolver::new(&store, "runs").unwrap(),
        vec![("k1".to_string(), ())],
        |_: &(), _key: &str| -> Result<Launched, BoxError> {
            let item = store.create_item("fresh", "job")?;
            Ok(Launched {
                item: item.id,
                key: "old".to_string(),
            })
        },
        |_: &ItemRecord| true,
        LaunchConfig {
            force: true,
            ..config(1)
        },
    )
    .unwrap();

    let outcome = controller.step().unwrap();
    assert_eq!(outcome.launched.len(), 1);
    let bound = PathResolver::new(&store, "runs/old")
        .unwrap()
        .item()
        .unwrap()
        .unwrap();
    assert_ne!(bound.id, stale.id);
}
