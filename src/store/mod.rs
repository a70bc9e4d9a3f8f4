//! store
//!
//! Backing store abstraction for containers and items.
//!
//! # Modules
//!
//! - [`traits`] - The `Store` trait, record types and `StoreError`
//! - [`memory`] - In-memory store with query accounting
//! - [`file`] - JSON file store layered on the in-memory store
//!
//! # Design
//!
//! The resolver and launcher only ever talk to `&dyn Store`. Production
//! deployments can plug in any persistence engine that satisfies the trait;
//! the two implementations here cover tests and the bundled CLI.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::{MemoryStore, StoreSnapshot};
pub use traits::{ContainerRecord, ItemRecord, Store, StoreError};
