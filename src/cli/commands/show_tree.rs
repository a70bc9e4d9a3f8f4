//! show-tree command - Print a decorated tree of a path
//!
//! Decorators are taken from `--decorate`, falling back to `[tree]
//! decorators` in the config file and finally to the item marker.

use anyhow::{bail, Context as _, Result};

use crate::cli::Context;
use crate::tree::{build_tree, decorator_by_name, Decorator};
use crate::ui::output;

pub fn show_tree(ctx: &Context, path: &str, decorate: &[String]) -> Result<()> {
    let names = if decorate.is_empty() {
        ctx.config.tree_decorators()
    } else {
        decorate.to_vec()
    };
    let mut decorators: Vec<Decorator> = Vec::with_capacity(names.len());
    for name in &names {
        match decorator_by_name(name) {
            Some(decorator) => decorators.push(decorator),
            None => bail!(
                "Unknown decorator '{}', must be one of: {}",
                name,
                crate::tree::decorate::DECORATOR_NAMES.join(", ")
            ),
        }
    }

    let store = ctx.open_store()?;
    let mut root = ctx.resolver(&store, path)?;
    let tree = build_tree(&mut root, &decorators)
        .with_context(|| format!("Failed to build tree for '{}'", path))?;
    output::print(tree.render().trim_end(), ctx.verbosity);
    Ok(())
}
