//! launch
//!
//! Bounded-concurrency launching of pending work into a target namespace.
//!
//! # Design
//!
//! The controller keeps no record of what it launched. Each iteration
//! re-derives the launched set from the item children of the target path,
//! keyed by alias, so a restarted loop picks up where the last one stopped
//! and never launches a key that is already bound in the target.
//!
//! ```text
//! Scanning -> Launching -> Waiting -> Scanning -> ... -> Stopped
//! ```
//!
//! One iteration ([`LaunchController::step`]):
//!
//! 1. list the target's item children; `running` counts the unfinished ones
//! 2. re-read the pending source if it is dynamic (never on the first pass)
//! 3. drop pending keys already present in the target; stop when none remain
//!    unless `no_stop` is set
//! 4. launch the first `max_concurrent - running` of the rest, binding each
//!    launched item into the target under its key
//!
//! [`LaunchController::run`] repeats `step` with a sleep in between.
//!
//! # Concurrency
//!
//! One controller per target. Two controllers on the same target can both
//! see a key as missing and launch it twice.
//!
//! # Example
//!
//! ```
//! use pathbind::launch::{BoxError, LaunchConfig, LaunchController, Launched};
//! use pathbind::resolver::PathResolver;
//! use pathbind::store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let target = PathResolver::new(&store, "runs").unwrap();
//! let pending = vec![("k1".to_string(), "input-1"), ("k2".to_string(), "input-2")];
//!
//! let config = LaunchConfig { max_concurrent: 2, ..LaunchConfig::default() };
//! let mut controller = LaunchController::new(
//!     target,
//!     pending,
//!     |work: &&str, key: &str| -> Result<Launched, BoxError> {
//!         let item = store.create_item(work, "job");
//!         Ok(Launched { item: item.id, key: key.to_string() })
//!     },
//!     |_item: &pathbind::store::ItemRecord| true,
//!     config,
//! )
//! .unwrap();
//!
//! let outcome = controller.step().unwrap();
//! assert_eq!(outcome.launched.len(), 2);
//! ```

pub mod report;
pub mod source;

pub use report::Reporter;
pub use source::{NamespaceSource, PendingSource};

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::types::ItemId;
use crate::resolver::{PathKind, PathResolver, ResolveError};
use crate::store::ItemRecord;

/// Boxed error returned by launch callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from the launch loop.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The launch callback failed. The loop is aborted.
    #[error("launching '{key}' failed: {source}")]
    Callback {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read pending work: {0}")]
    Source(#[source] ResolveError),

    #[error("invalid launch configuration: {0}")]
    InvalidConfig(String),
}

/// Loop state between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Scanning,
    Launching,
    Waiting,
    Stopped,
}

/// Launch loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchConfig {
    /// Ceiling on unfinished items in the target. At least 1.
    pub max_concurrent: usize,
    /// Pause between iterations in [`LaunchController::run`].
    pub sleep: Duration,
    /// Rebind keys over existing target bindings.
    pub force: bool,
    /// Report the first batch instead of launching it, then stop.
    pub dry_run: bool,
    /// Re-read the pending source on every iteration after the first.
    pub dynamic_source: bool,
    /// Keep polling when nothing is left to launch.
    pub no_stop: bool,
    pub log_to_stdout: bool,
    pub logfile: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            sleep: Duration::from_secs(120),
            force: false,
            dry_run: false,
            dynamic_source: false,
            no_stop: false,
            log_to_stdout: false,
            logfile: None,
        }
    }
}

impl LaunchConfig {
    /// # Errors
    ///
    /// Returns `LaunchError::InvalidConfig` if `max_concurrent` is zero.
    pub fn validate(&self) -> Result<(), LaunchError> {
        if self.max_concurrent == 0 {
            return Err(LaunchError::InvalidConfig(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// What the callback launched and the key to bind it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launched {
    pub item: ItemId,
    pub key: String,
}

/// Starts one piece of work.
///
/// Implemented for any `FnMut(&W, &str) -> Result<Launched, BoxError>`.
pub trait Launcher<W> {
    fn launch(&mut self, work: &W, key: &str) -> Result<Launched, BoxError>;
}

impl<W, F> Launcher<W> for F
where
    F: FnMut(&W, &str) -> Result<Launched, BoxError>,
{
    fn launch(&mut self, work: &W, key: &str) -> Result<Launched, BoxError> {
        self(work, key)
    }
}

/// Result of one iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Unfinished items in the target at scan time.
    pub running: usize,
    /// Pending keys not yet in the target at scan time.
    pub remaining: usize,
    /// Work launched and bound during this iteration.
    pub launched: Vec<Launched>,
    /// Keys a dry run would have launched.
    pub planned: Vec<String>,
}

/// Drives pending work into a target namespace.
pub struct LaunchController<'s, S, L, P>
where
    S: PendingSource,
{
    target: PathResolver<'s>,
    source: S,
    launcher: L,
    finished: P,
    config: LaunchConfig,
    state: LaunchState,
    iteration: usize,
    pending: Option<Vec<(String, S::Work)>>,
    reporter: Reporter,
}

impl<'s, S, L, P> LaunchController<'s, S, L, P>
where
    S: PendingSource,
    L: Launcher<S::Work>,
    P: Fn(&ItemRecord) -> bool,
{
    /// # Errors
    ///
    /// Returns `LaunchError::InvalidConfig` for an invalid `config`.
    pub fn new(
        target: PathResolver<'s>,
        source: S,
        launcher: L,
        finished: P,
        config: LaunchConfig,
    ) -> Result<Self, LaunchError> {
        config.validate()?;
        let reporter = Reporter::new(config.log_to_stdout, config.logfile.clone());
        Ok(Self {
            target,
            source,
            launcher,
            finished,
            config,
            state: LaunchState::Scanning,
            iteration: 0,
            pending: None,
            reporter,
        })
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Completed iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn target(&self) -> &PathResolver<'s> {
        &self.target
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Aliases and records of the items currently bound in the target.
    fn scan_target(&mut self) -> Result<Vec<(String, ItemRecord)>, LaunchError> {
        if self.target.is_virtual()? {
            return Ok(Vec::new());
        }
        let children = {
            let mut scan = self.target.only_items();
            scan.fast_children()?
        };
        let mut launched = Vec::with_capacity(children.len());
        for child in children {
            if child.resolve()? != PathKind::Item {
                continue;
            }
            if let Some(item) = child.item()? {
                launched.push((child.key().to_string(), item));
            }
        }
        Ok(launched)
    }

    fn refresh_pending(&mut self) -> Result<(), LaunchError> {
        let first = self.pending.is_none();
        if first || self.config.dynamic_source {
            let pending = self.source.pending().map_err(LaunchError::Source)?;
            tracing::debug!(count = pending.len(), "read pending work");
            self.pending = Some(pending);
        }
        Ok(())
    }

    /// Run one iteration.
    ///
    /// Does nothing once the controller is stopped.
    ///
    /// # Errors
    ///
    /// A failing callback aborts the iteration with `LaunchError::Callback`.
    /// Work launched earlier in the same iteration stays bound.
    pub fn step(&mut self) -> Result<StepOutcome, LaunchError> {
        if self.state == LaunchState::Stopped {
            return Ok(StepOutcome::default());
        }
        if self.iteration == 0 && self.pending.is_none() && self.target.is_virtual()? {
            self.target.get_or_create_container()?;
        }

        self.state = LaunchState::Scanning;
        self.reporter.start_iteration();
        let started = std::time::Instant::now();
        let launched = self.scan_target()?;
        self.refresh_pending()?;
        let keys: HashSet<&str> = launched.iter().map(|(k, _)| k.as_str()).collect();
        let running = launched
            .iter()
            .filter(|(_, item)| !(self.finished)(item))
            .count();
        self.reporter
            .report(format!("Total number of running jobs: {running}"));

        let pending = self.pending.as_deref().unwrap_or_default();
        let remaining: Vec<usize> = pending
            .iter()
            .enumerate()
            .filter(|(_, (key, _))| !keys.contains(key.as_str()))
            .map(|(i, _)| i)
            .collect();
        let mut outcome = StepOutcome {
            running,
            remaining: remaining.len(),
            ..StepOutcome::default()
        };

        if remaining.is_empty() && !self.config.no_stop {
            self.reporter.report("No job to launch left - stopping");
            self.state = LaunchState::Stopped;
            return Ok(outcome);
        }
        self.reporter
            .report(format!("Total number of jobs to run: {}", remaining.len()));
        self.reporter.report(format!(
            "Time elapsed to gather jobs: {:.2} seconds",
            started.elapsed().as_secs_f64()
        ));

        self.state = LaunchState::Launching;
        let free = self.config.max_concurrent.saturating_sub(running);
        if free > 0 {
            let batch: Vec<usize> = remaining.into_iter().take(free).collect();
            if self.config.dry_run {
                outcome.planned = batch.iter().map(|&i| pending[i].0.clone()).collect();
                self.reporter.report(format!(
                    "DRYRUN: About to launch {} jobs with labels: {:?}",
                    batch.len(),
                    outcome.planned
                ));
                self.state = LaunchState::Stopped;
                return Ok(outcome);
            }

            self.reporter.report(format!("Launching {} jobs...", batch.len()));
            for i in batch {
                let (key, work) = &pending[i];
                let result = self
                    .launcher
                    .launch(work, key)
                    .map_err(|source| LaunchError::Callback {
                        key: key.clone(),
                        source,
                    })?;
                self.target
                    .add_item(result.item, &result.key, self.config.force)?;
                tracing::info!(key = %result.key, item = %result.item, "launched");
                outcome.launched.push(result);
            }
            self.reporter
                .report(format!("Launched {} jobs", outcome.launched.len()));
        }

        self.state = LaunchState::Waiting;
        self.iteration += 1;
        Ok(outcome)
    }

    /// Iterate until stopped, sleeping between iterations.
    ///
    /// Returns everything launched. With `no_stop` set this only returns on
    /// error.
    pub fn run(&mut self) -> Result<Vec<Launched>, LaunchError> {
        let mut all = Vec::new();
        loop {
            let outcome = self.step()?;
            all.extend(outcome.launched);
            if self.state == LaunchState::Stopped {
                return Ok(all);
            }
            std::thread::sleep(self.config.sleep);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Store};
    use serde_json::{json, Value};

    fn is_finished(item: &ItemRecord) -> bool {
        item.metadata("state") == Some(&json!("finished"))
    }

    fn work(keys: &[&str]) -> Vec<(String, String)> {
        keys.iter().map(|k| (k.to_string(), format!("o-{k}"))).collect()
    }

    fn config(max_concurrent: usize) -> LaunchConfig {
        LaunchConfig {
            max_concurrent,
            sleep: Duration::ZERO,
            ..LaunchConfig::default()
        }
    }

    fn finish(store: &MemoryStore, path: &str) {
        let item = PathResolver::new(store, path).unwrap().item().unwrap().unwrap();
        store
            .set_metadata(item.id, "state", Value::from("finished"))
            .unwrap();
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        let store = MemoryStore::new();
        let err = LaunchController::new(
            PathResolver::new(&store, "t").unwrap(),
            work(&["k1"]),
            |_: &String, key: &str| -> Result<Launched, BoxError> {
                Err(format!("unexpected {key}").into())
            },
            is_finished,
            config(0),
        )
        .err()
        .unwrap();
        assert!(matches!(err, LaunchError::InvalidConfig(_)));
    }

    #[test]
    fn ceiling_limits_each_iteration() {
        let store = MemoryStore::new();
        let mut calls = Vec::new();
        let mut controller = LaunchController::new(
            PathResolver::new(&store, "t").unwrap(),
            work(&["k1", "k2", "k3"]),
            |w: &String, key: &str| -> Result<Launched, BoxError> {
                calls.push(key.to_string());
                let item = store.create_item(w, "job");
                Ok(Launched { item: item.id, key: key.to_string() })
            },
            is_finished,
            config(2),
        )
        .unwrap();

        let first = controller.step().unwrap();
        assert_eq!(first.running, 0);
        let keys: Vec<&str> = first.launched.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["k1", "k2"]);
        assert_eq!(controller.state(), LaunchState::Waiting);

        let idle = controller.step().unwrap();
        assert_eq!(idle.running, 2);
        assert!(idle.launched.is_empty());

        finish(&store, "t/k1");
        let second = controller.step().unwrap();
        assert_eq!(second.running, 1);
        assert_eq!(second.launched.len(), 1);
        assert_eq!(second.launched[0].key, "k3");

        finish(&store, "t/k2");
        finish(&store, "t/k3");
        let last = controller.step().unwrap();
        assert_eq!(last.remaining, 0);
        assert_eq!(controller.state(), LaunchState::Stopped);
        drop(controller);
        assert_eq!(calls, vec!["k1", "k2", "k3"]);
    }

    #[test]
    fn restart_skips_present_keys() {
        let store = MemoryStore::new();
        let mut target = PathResolver::new(&store, "t").unwrap();
        for key in ["k1", "k2", "k3"] {
            let item = store.create_item(key, "job");
            target.add_item(item.id, key, false).unwrap();
            finish(&store, &format!("t/{key}"));
        }

        let mut controller = LaunchController::new(
            target,
            work(&["k1", "k2", "k3"]),
            |_: &String, key: &str| -> Result<Launched, BoxError> {
                Err(format!("relaunched {key}").into())
            },
            is_finished,
            config(2),
        )
        .unwrap();
        assert!(controller.run().unwrap().is_empty());
        assert_eq!(controller.state(), LaunchState::Stopped);
    }

    #[test]
    fn dry_run_plans_without_launching() {
        let store = MemoryStore::new();
        let mut controller = LaunchController::new(
            PathResolver::new(&store, "t").unwrap(),
            work(&["k1", "k2", "k3"]),
            |_: &String, key: &str| -> Result<Launched, BoxError> {
                Err(format!("dry run launched {key}").into())
            },
            is_finished,
            LaunchConfig {
                dry_run: true,
                ..config(2)
            },
        )
        .unwrap();

        let outcome = controller.step().unwrap();
        assert_eq!(outcome.planned, vec!["k1", "k2"]);
        assert!(outcome.launched.is_empty());
        assert_eq!(controller.state(), LaunchState::Stopped);
        assert!(controller.target().is_container().unwrap());
        assert!(controller
            .reporter()
            .messages()
            .iter()
            .any(|m| m.starts_with("DRYRUN")));
    }

    #[test]
    fn callback_failure_aborts() {
        let store = MemoryStore::new();
        let mut controller = LaunchController::new(
            PathResolver::new(&store, "t").unwrap(),
            work(&["k1", "k2"]),
            |w: &String, key: &str| -> Result<Launched, BoxError> {
                if key == "k2" {
                    return Err("queue full".into());
                }
                let item = store.create_item(w, "job");
                Ok(Launched { item: item.id, key: key.to_string() })
            },
            is_finished,
            config(5),
        )
        .unwrap();

        match controller.step() {
            Err(LaunchError::Callback { key, source }) => {
                assert_eq!(key, "k2");
                assert_eq!(source.to_string(), "queue full");
            }
            other => panic!("expected callback error, got {other:?}"),
        }
        assert!(PathResolver::new(&store, "t/k1").unwrap().is_item().unwrap());
    }

    #[test]
    fn dynamic_namespace_source_is_rescanned() {
        let store = MemoryStore::new();
        let mut inputs = PathResolver::new(&store, "inputs").unwrap();
        let first = store.create_item("a", "data");
        inputs.add_item(first.id, "a", false).unwrap();

        let mut controller = LaunchController::new(
            PathResolver::new(&store, "t").unwrap(),
            NamespaceSource::new(inputs.clone()),
            |input: &ItemRecord, key: &str| -> Result<Launched, BoxError> {
                let item = store.create_item(&format!("run-{}", input.label), "job");
                Ok(Launched { item: item.id, key: key.to_string() })
            },
            |_: &ItemRecord| true,
            LaunchConfig {
                dynamic_source: true,
                ..config(3)
            },
        )
        .unwrap();

        assert_eq!(controller.step().unwrap().launched.len(), 1);

        let second = store.create_item("b", "data");
        inputs.add_item(second.id, "b", false).unwrap();
        let outcome = controller.step().unwrap();
        assert_eq!(outcome.launched.len(), 1);
        assert_eq!(outcome.launched[0].key, "b");

        controller.step().unwrap();
        assert_eq!(controller.state(), LaunchState::Stopped);
    }

    #[test]
    fn no_stop_keeps_polling() {
        let store = MemoryStore::new();
        let mut controller = LaunchController::new(
            PathResolver::new(&store, "t").unwrap(),
            Vec::<(String, String)>::new(),
            |_: &String, key: &str| -> Result<Launched, BoxError> {
                Err(format!("nothing to launch, got {key}").into())
            },
            is_finished,
            LaunchConfig {
                no_stop: true,
                ..config(1)
            },
        )
        .unwrap();
        controller.step().unwrap();
        let per_iteration = controller.reporter().messages().len();
        for _ in 0..50 {
            controller.step().unwrap();
        }
        assert_eq!(controller.state(), LaunchState::Waiting);
        assert_eq!(controller.iteration(), 51);
        assert_eq!(controller.reporter().messages().len(), per_iteration);
        assert!(controller.reporter().messages()[0].starts_with("Total number of running jobs"));
    }

    #[test]
    fn dynamic_source_is_read_after_the_scan() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Recording {
            calls: Rc<RefCell<Vec<usize>>>,
            store: MemoryStore,
        }

        impl PendingSource for Recording {
            type Work = String;

            fn pending(&mut self) -> Result<Vec<(String, String)>, ResolveError> {
                let queries = self.store.query_count();
                self.calls.borrow_mut().push(queries);
                Ok(Vec::new())
            }
        }

        let store = MemoryStore::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let source = Recording {
            calls: Rc::clone(&calls),
            store: store.clone(),
        };
        let mut controller = LaunchController::new(
            PathResolver::new(&store, "t").unwrap(),
            source,
            |_: &String, key: &str| -> Result<Launched, BoxError> {
                Err(format!("unexpected launch of {key}").into())
            },
            is_finished,
            LaunchConfig {
                dynamic_source: true,
                no_stop: true,
                ..config(1)
            },
        )
        .unwrap();

        controller.step().unwrap();
        store.reset_query_count();
        controller.step().unwrap();
        assert_eq!(calls.borrow().len(), 2);
        assert!(calls.borrow()[1] > 0, "target must be scanned before reading pending work");
    }
}
