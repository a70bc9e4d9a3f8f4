//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--store <file>`: JSON store file (overrides the config file)
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pb - alias paths over a container/item store
#[derive(Parser, Debug)]
#[command(name = "pb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON store file to operate on
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a tree diagram of a path and everything below it
    #[command(
        name = "show-tree",
        after_help = "\
EXAMPLES:
    # Items are marked with '*' by default
    pb show-tree project

    # Show ids and store labels instead
    pb show-tree project --decorate uuid_first_12 --decorate label

DECORATORS:
    item, container, uuid, uuid_first_12, label, container_names"
    )]
    ShowTree {
        /// Path to start from (empty for the root)
        path: String,

        /// Decorator to apply; may be repeated
        #[arg(long = "decorate", value_name = "NAME")]
        decorate: Vec<String>,
    },

    /// Show the item or container at a path
    Show {
        path: String,

        /// Also list the most recently deleted alias of each member
        #[arg(long)]
        include_deleted: bool,
    },

    /// Bind an item under a path with an alias
    #[command(name = "add-item")]
    AddItem {
        /// Container path (created if virtual)
        path: String,

        /// Alias for the item within the container
        alias: String,

        /// Item id
        item: String,

        /// Replace an existing binding of the alias or of the item
        #[arg(long)]
        force: bool,
    },

    /// Change the alias of the item at a path
    Rename {
        path: String,

        /// New alias
        alias: String,
    },

    /// Remove the alias of the item at a path
    Unlink {
        path: String,

        /// Do not remember the removed alias
        #[arg(long)]
        no_history: bool,
    },

    /// Print every path an item is bound under
    Alias {
        /// Item id
        item: String,
    },

    /// Create the container for a path
    Mkdir { path: String },

    /// Create a new item and print its id
    #[command(name = "new-item")]
    NewItem {
        /// Free-form item label
        label: String,

        /// Item type tag
        #[arg(long, default_value = "data")]
        kind: String,
    },
}
