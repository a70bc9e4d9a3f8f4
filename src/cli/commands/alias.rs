//! alias command - Print every path an item is bound under

use anyhow::{bail, Result};

use super::parse_item_id;
use crate::cli::Context;
use crate::resolver::item_paths;
use crate::store::Store;
use crate::ui::output;

pub fn alias(ctx: &Context, item: &str) -> Result<()> {
    let id = parse_item_id(item)?;
    let store = ctx.open_store()?;
    if store.item(id)?.is_none() {
        bail!("Item {} does not exist", id);
    }

    let paths = item_paths(&store, id)?;
    if paths.is_empty() {
        bail!("Item {} is not bound under any path", id);
    }
    output::print(output::format_list(&paths, ""), ctx.verbosity);
    Ok(())
}
