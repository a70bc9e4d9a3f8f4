//! core
//!
//! Core domain types shared by every layer.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ItemId, ContainerId, ContainerKind
//! - [`path`] - Path syntax and the `NodePath` value
//! - [`alias`] - Alias metadata layout on items
//! - [`config`] - Configuration schema and loading

pub mod alias;
pub mod config;
pub mod path;
pub mod types;
