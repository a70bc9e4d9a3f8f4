//! tree
//!
//! Decorated tree views of a path and its descendants.
//!
//! # Design
//!
//! [`build_tree`] walks depth-first, listing each level with
//! `fast_children` so every child arrives with its record attached and the
//! decorators resolve it without further queries. The result is a plain
//! [`TreeNode`] value, rendered separately with box-drawing connectors.
//!
//! # Example
//!
//! ```
//! use pathbind::resolver::PathResolver;
//! use pathbind::store::MemoryStore;
//! use pathbind::tree::{build_tree, decorate};
//!
//! let store = MemoryStore::new();
//! let item = store.create_item("relax", "job");
//! let mut runs = PathResolver::new(&store, "project/runs").unwrap();
//! runs.add_item(item.id, "relax", false).unwrap();
//!
//! let mut root = PathResolver::new(&store, "project").unwrap();
//! let tree = build_tree(&mut root, &[decorate::decorate_item()]).unwrap();
//! assert_eq!(tree.render(), "project\n└── runs\n    └── relax *\n");
//! ```

pub mod decorate;

pub use decorate::{decorator_by_name, Decorator};

use crate::core::path::NodePath;
use crate::resolver::{PathKind, PathResolver, ResolveError};

/// One node of a built tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: NodePath,
    /// Trailing segment plus decorator suffixes.
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Render with box-drawing connectors, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.label);
        out.push('\n');
        self.render_children("", &mut out);
        out
    }

    fn render_children(&self, prefix: &str, out: &mut String) {
        let last = self.children.len().saturating_sub(1);
        for (i, child) in self.children.iter().enumerate() {
            let (branch, extend) = if i == last {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            out.push_str(prefix);
            out.push_str(branch);
            out.push_str(&child.label);
            out.push('\n');
            child.render_children(&format!("{prefix}{extend}"), out);
        }
    }

    /// Number of nodes including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

impl std::fmt::Display for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Trailing segment followed by every applicable decorator output.
pub fn decorated_label(path: &PathResolver<'_>, decorators: &[Decorator]) -> String {
    let suffixes: Vec<String> = decorators.iter().filter_map(|d| d(path)).collect();
    if suffixes.is_empty() {
        path.key().to_string()
    } else {
        format!("{} {}", path.key(), suffixes.join(" | "))
    }
}

/// Build the decorated tree rooted at `path`.
///
/// Children are sorted by label at every level.
///
/// # Errors
///
/// Returns `ResolveError::NoDescendants` if `path` is virtual with nothing
/// below it, or any store error met along the way.
pub fn build_tree(
    path: &mut PathResolver<'_>,
    decorators: &[Decorator],
) -> Result<TreeNode, ResolveError> {
    let label = decorated_label(path, decorators);
    let mut children = Vec::new();
    if path.resolve()? != PathKind::Item {
        for mut child in path.fast_children()? {
            children.push(build_tree(&mut child, decorators)?);
        }
    }
    children.sort_by(|a: &TreeNode, b: &TreeNode| a.label.cmp(&b.label));
    Ok(TreeNode {
        path: path.path().clone(),
        label,
        children,
    })
}
