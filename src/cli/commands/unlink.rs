//! unlink command - Remove the alias of the item at a path
//!
//! The item stays in its container. Unless `--no-history` is given the
//! removed alias is remembered as the item's deleted alias for that
//! container.

use anyhow::Result;

use crate::cli::Context;
use crate::ui::output;

pub fn unlink(ctx: &Context, path: &str, keep_history: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let mut resolver = ctx.resolver(&store, path)?;
    let item = resolver.unlink(keep_history)?;
    output::print(format!("Unlinked {} from '{}'.", item, path), ctx.verbosity);
    Ok(())
}
