//! mkdir command - Create the container for a path

use anyhow::Result;

use crate::cli::Context;
use crate::ui::output;

pub fn mkdir(ctx: &Context, path: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let mut resolver = ctx.resolver(&store, path)?;
    let (container, created) = resolver.get_or_create_container()?;
    if created {
        output::print(format!("Created container '{}'.", container.label), ctx.verbosity);
    } else {
        output::print(
            format!("Container '{}' already exists.", container.label),
            ctx.verbosity,
        );
    }
    Ok(())
}
