//! core::path
//!
//! Slash-delimited path coordinates.
//!
//! # Syntax
//!
//! A path is a sequence of non-empty segments joined by [`DELIMITER`]. The
//! empty string is the root path. Leading, trailing, or doubled delimiters
//! are rejected, so `/a`, `a/`, `/a/` and `a//b` are all invalid, as are
//! segments with control characters. `.` and `..` are ordinary segments.
//!
//! A `NodePath` carries no store state. Whether it names a container, an
//! item, or nothing at all is decided by the resolver at query time.
//!
//! # Example
//!
//! ```
//! use pathbind::core::path::NodePath;
//!
//! let path = NodePath::parse("a/b").unwrap();
//! assert_eq!(path.key(), "b");
//! assert_eq!(path.parent().unwrap().as_str(), "a");
//! assert_eq!(path.join("c/d").unwrap().as_str(), "a/b/c/d");
//! assert!(NodePath::root().parent().is_none());
//! assert!(NodePath::parse("a//b").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between path segments.
pub const DELIMITER: char = '/';

/// Errors from path parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathSyntaxError {
    #[error("invalid path '{path}': {reason}")]
    Invalid { path: String, reason: &'static str },
}

impl PathSyntaxError {
    fn invalid(path: &str, reason: &'static str) -> Self {
        Self::Invalid {
            path: path.to_string(),
            reason,
        }
    }
}

/// A validated slash-delimited path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// The root path (empty string).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and validate a path.
    ///
    /// # Errors
    ///
    /// Returns `PathSyntaxError::Invalid` for leading, trailing or repeated
    /// delimiters, and for segments containing control characters.
    pub fn parse(path: &str) -> Result<Self, PathSyntaxError> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        if path.starts_with(DELIMITER) {
            return Err(PathSyntaxError::invalid(path, "cannot start with '/'"));
        }
        if path.ends_with(DELIMITER) {
            return Err(PathSyntaxError::invalid(path, "cannot end with '/'"));
        }

        let mut segments = Vec::new();
        for segment in path.split(DELIMITER) {
            if segment.is_empty() {
                return Err(PathSyntaxError::invalid(path, "cannot contain '//'"));
            }
            if segment.chars().any(|c| c.is_control()) {
                return Err(PathSyntaxError::invalid(
                    path,
                    "cannot contain control characters",
                ));
            }
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Build a path from already-split segments.
    pub(crate) fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    /// Append a relative path (one or more segments).
    ///
    /// # Errors
    ///
    /// Returns `PathSyntaxError` if `rest` is empty or invalid.
    pub fn join(&self, rest: &str) -> Result<Self, PathSyntaxError> {
        let rest_path = Self::parse(rest)?;
        if rest_path.is_root() {
            return Err(PathSyntaxError::invalid(rest, "cannot join an empty path"));
        }
        let mut segments = self.segments.clone();
        segments.extend(rest_path.segments);
        Ok(Self { segments })
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The trailing segment, empty for the root.
    pub fn key(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The delimiter-joined form.
    pub fn as_str(&self) -> String {
        self.segments.join("/")
    }

    /// Label prefix that every strict descendant's label starts with.
    ///
    /// The root has an empty prefix, which matches every label.
    pub fn descendant_prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}{}", self.as_str(), DELIMITER)
        }
    }
}

impl TryFrom<String> for NodePath {
    type Error = PathSyntaxError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<NodePath> for String {
    fn from(path: NodePath) -> Self {
        path.as_str()
    }
}

impl std::str::FromStr for NodePath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["/a", "a/", "/a/", "a//b", "/"] {
            assert!(NodePath::parse(bad).is_err(), "{bad} should be invalid");
        }
    }

    #[test]
    fn root_properties() {
        let root = NodePath::parse("").unwrap();
        assert!(root.is_root());
        assert_eq!(root.as_str(), "");
        assert_eq!(root.key(), "");
        assert!(root.parent().is_none());
        assert_eq!(root.descendant_prefix(), "");
    }

    #[test]
    fn concatenation() {
        let root = NodePath::root();
        assert_eq!(root.join("a").unwrap().as_str(), "a");
        assert_eq!(
            root.join("a").unwrap().join("b").unwrap(),
            root.join("a/b").unwrap()
        );
        assert_eq!(
            NodePath::parse("a/b/c").unwrap(),
            NodePath::parse("a/b").unwrap().join("c").unwrap()
        );
        assert!(root.join("").is_err());
        assert!(root.join("x/").is_err());
    }

    #[test]
    fn descendant_prefix_ends_with_delimiter() {
        let a = NodePath::parse("a").unwrap();
        assert_eq!(a.descendant_prefix(), "a/");
        assert!("a/c/d".starts_with(&a.descendant_prefix()));
        assert!(!"ab".starts_with(&a.descendant_prefix()));
    }

    #[test]
    fn dot_segments_are_literal() {
        let path = NodePath::parse("a/../.").unwrap();
        assert_eq!(path.segments(), ["a", "..", "."]);
        assert_eq!(path.parent().unwrap().as_str(), "a/..");
        assert!(NodePath::parse("a/\u{7}b").is_err());
    }

    #[test]
    fn serde_validates() {
        let path: NodePath = serde_json::from_str("\"a/b\"").unwrap();
        assert_eq!(path.depth(), 2);
        assert!(serde_json::from_str::<NodePath>("\"a//b\"").is_err());
    }
}
