//! pathbind - alias paths over a flat store of containers and items
//!
//! Containers carry slash-delimited labels; items carry per-container alias
//! metadata. Together they form a virtual hierarchy addressed by paths such
//! as `project/runs/relax`, with no tree stored anywhere.
//!
//! # Architecture
//!
//! - [`core`] - Path syntax, ids, alias metadata layout, configuration
//! - [`store`] - The `Store` trait with in-memory and JSON file backends
//! - [`resolver`] - Path resolution, iteration, binding and unlinking
//! - [`tree`] - Decorated tree views built from a resolver
//! - [`launch`] - Bounded-concurrency launching into a target namespace
//! - [`cli`] - The `pb` command-line interface
//! - [`ui`] - Console output helpers
//!
//! # Correctness Invariants
//!
//! 1. A path resolves to exactly one of item, container or virtual
//! 2. An item has at most one active alias per container
//! 3. A rejected mutation leaves the store unchanged
//! 4. A launch loop never launches a key already bound in its target

pub mod cli;
pub mod core;
pub mod launch;
pub mod resolver;
pub mod store;
pub mod tree;
pub mod ui;
