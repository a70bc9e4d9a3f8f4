//! cli
//!
//! Command-line interface layer for `pb`.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber and load configuration
//! - Delegate to command handlers
//!
//! Handlers only go through [`crate::resolver`] operations; none of them
//! edits alias metadata directly.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::types::ContainerKind;
use crate::resolver::PathResolver;
use crate::store::FileStore;
use crate::ui::output::{self, Verbosity};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PATHBIND_LOG";

/// Execution context for commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Store file to open.
    pub store: PathBuf,
    /// Container kind paths resolve within.
    pub kind: ContainerKind,
    pub verbosity: Verbosity,
    pub config: Config,
}

impl Context {
    /// Open the configured store file. A missing file is an empty store.
    pub fn open_store(&self) -> Result<FileStore> {
        FileStore::open(&self.store)
            .with_context(|| format!("Failed to open store '{}'", self.store.display()))
    }

    /// Resolver for `path` in the configured container kind.
    pub fn resolver<'s>(&self, store: &'s FileStore, path: &str) -> Result<PathResolver<'s>> {
        let resolver = PathResolver::new(store, path)
            .with_context(|| format!("Invalid path '{}'", path))?;
        Ok(resolver.with_kind(self.kind.clone()))
    }
}

/// Default store location, `~/.pathbind/store.json`.
fn default_store_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("home directory not found; pass --store")?;
    Ok(home.join(".pathbind/store.json"))
}

/// Install the `tracing` subscriber.
///
/// `PATHBIND_LOG` takes an `EnvFilter` directive; without it the level is
/// `warn`, or `debug` with `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    // Already installed when called twice in one process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let loaded = Config::load().context("Failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(
            format!("{} ({})", warning.message, warning.path.display()),
            verbosity,
        );
    }
    let config = loaded.config;

    let store = match cli.store.clone().or_else(|| config.store_path().map(Into::into)) {
        Some(path) => path,
        None => default_store_path()?,
    };
    output::debug(format!("store: {}", store.display()), verbosity);

    let ctx = Context {
        store,
        kind: config.container_kind(),
        verbosity,
        config,
    };

    commands::dispatch(cli.command, &ctx)
}
