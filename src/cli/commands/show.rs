//! show command - Show the item or container at a path
//!
//! An item prints its properties and every path it is bound under. A
//! container prints its properties and a member table with each member's
//! alias (and, on request, its last deleted alias).

use anyhow::{bail, Result};
use chrono::Utc;
use comfy_table::{presets, Table};

use crate::cli::Context;
use crate::core::alias::{record_alias, AliasSlot};
use crate::resolver::{item_paths, PathKind};
use crate::store::Store;
use crate::ui::output::{self, format_age};

/// Borderless table, optionally with a header row.
fn plain_table(header: Option<&[&str]>, rows: Vec<Vec<String>>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    if let Some(header) = header {
        table.set_header(header.to_vec());
    }
    table.add_rows(rows);
    table
}

pub fn show(ctx: &Context, path: &str, include_deleted: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let resolver = ctx.resolver(&store, path)?;

    match resolver.resolve()? {
        PathKind::Item => {
            let Some(item) = resolver.item()? else {
                bail!("Path '{}' does not correspond to an item", path);
            };
            let paths: Vec<String> = item_paths(&store, item.id)?
                .iter()
                .map(|p| p.as_str())
                .collect();
            let rows = vec![
                vec!["Id".to_string(), item.id.to_string()],
                vec!["Label".to_string(), item.label.clone()],
                vec!["Kind".to_string(), item.kind.clone()],
                vec!["Created".to_string(), item.created.to_rfc3339()],
                vec!["Paths".to_string(), paths.join(", ")],
            ];
            output::print(plain_table(None, rows), ctx.verbosity);
        }
        PathKind::Container => {
            let Some(container) = resolver.container()? else {
                bail!("Path '{}' does not correspond to a container", path);
            };
            let description = if container.description.is_empty() {
                "<no description>".to_string()
            } else {
                container.description.clone()
            };
            let rows = vec![
                vec!["Container label".to_string(), container.label.clone()],
                vec!["Container kind".to_string(), container.kind.to_string()],
                vec!["Container description".to_string(), description],
            ];
            output::print(plain_table(None, rows), ctx.verbosity);

            let headers: &[&str] = if include_deleted {
                &["Id", "Alias", "Alias(deleted)", "Kind", "Created"]
            } else {
                &["Id", "Alias", "Kind", "Created"]
            };
            let now = Utc::now();
            let mut rows = Vec::new();
            for item in store.members(container.id)? {
                let mut row = vec![
                    item.id.short(12),
                    record_alias(&item, container.id, AliasSlot::Active).unwrap_or_default(),
                ];
                if include_deleted {
                    row.push(
                        record_alias(&item, container.id, AliasSlot::Deleted).unwrap_or_default(),
                    );
                }
                row.push(item.kind.clone());
                row.push(format_age(item.created, now));
                rows.push(row);
            }
            output::print("# Items:", ctx.verbosity);
            output::print(plain_table(Some(headers), rows), ctx.verbosity);
        }
        PathKind::Virtual => {
            bail!("Path '{}' does not correspond to an item or a container", path)
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_table_aligns_columns() {
        let rows = vec![
            vec!["1".to_string(), "relax".to_string()],
            vec!["22".to_string(), "x".to_string()],
        ];
        let rendered = plain_table(Some(&["Id", "Alias"]), rows).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        let column = lines[0].find("Alias").unwrap();
        assert_eq!(lines[1].find("relax"), Some(column));
        assert_eq!(lines[2].find('x'), Some(column));
    }

    #[test]
    fn property_table_has_no_header() {
        let rows = vec![vec!["Label".to_string(), "relax".to_string()]];
        let rendered = plain_table(None, rows).to_string();
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains("Label") && rendered.contains("relax"));
    }
}
