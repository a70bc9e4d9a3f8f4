//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the store and builds resolvers for its path arguments
//! 2. Calls one resolver or store operation
//! 3. Formats and displays output
//!
//! Mutating handlers go through `PathResolver`, so every change is checked
//! for collisions and persisted by the file store.

mod add_item;
mod alias;
mod mkdir;
mod new_item;
mod rename;
mod show;
mod show_tree;
mod unlink;

pub use add_item::add_item;
pub use alias::alias;
pub use mkdir::mkdir;
pub use new_item::new_item;
pub use rename::rename;
pub use show::show;
pub use show_tree::show_tree;
pub use unlink::unlink;

use anyhow::{Context as _, Result};

use super::args::Command;
use super::Context;
use crate::core::types::ItemId;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::ShowTree { path, decorate } => show_tree(ctx, &path, &decorate),
        Command::Show {
            path,
            include_deleted,
        } => show(ctx, &path, include_deleted),
        Command::AddItem {
            path,
            alias,
            item,
            force,
        } => add_item(ctx, &path, &alias, &item, force),
        Command::Rename { path, alias } => rename(ctx, &path, &alias),
        Command::Unlink { path, no_history } => unlink(ctx, &path, !no_history),
        Command::Alias { item } => alias(ctx, &item),
        Command::Mkdir { path } => mkdir(ctx, &path),
        Command::NewItem { label, kind } => new_item(ctx, &label, &kind),
    }
}

/// Parse an item id argument.
pub(crate) fn parse_item_id(raw: &str) -> Result<ItemId> {
    ItemId::parse(raw).with_context(|| format!("Invalid item id '{}'", raw))
}
