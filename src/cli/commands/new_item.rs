//! new-item command - Create an item in the store
//!
//! Prints only the new id so scripts can capture it.

use anyhow::Result;

use crate::cli::Context;
use crate::ui::output;

pub fn new_item(ctx: &Context, label: &str, kind: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let item = store.create_item(label, kind)?;
    output::debug(format!("created item '{}' ({})", label, kind), ctx.verbosity);
    output::print(item.id, ctx.verbosity);
    Ok(())
}
