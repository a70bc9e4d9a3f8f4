//! rename command - Change the alias of the item at a path

use anyhow::Result;

use crate::cli::Context;
use crate::ui::output;

pub fn rename(ctx: &Context, path: &str, alias: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let mut resolver = ctx.resolver(&store, path)?;
    let renamed = resolver.rename(alias)?;
    output::print(format!("Renamed '{}' to '{}'.", path, renamed), ctx.verbosity);
    Ok(())
}
