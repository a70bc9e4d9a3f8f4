//! ui
//!
//! User-facing console output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing and table formatting

pub mod output;
