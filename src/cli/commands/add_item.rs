//! add-item command - Bind an item under a path

use anyhow::{bail, Result};

use super::parse_item_id;
use crate::cli::Context;
use crate::store::Store;
use crate::ui::output;

pub fn add_item(ctx: &Context, path: &str, alias: &str, item: &str, force: bool) -> Result<()> {
    let id = parse_item_id(item)?;
    let store = ctx.open_store()?;
    if store.item(id)?.is_none() {
        bail!("Item {} does not exist", id);
    }

    let mut resolver = ctx.resolver(&store, path)?;
    resolver.add_item(id, alias, force)?;
    output::print(
        format!("Added {} to path '{}' with alias '{}'.", id, path, alias),
        ctx.verbosity,
    );
    Ok(())
}
