//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ItemId`] - Identifier of an item in the backing store
//! - [`ContainerId`] - Identifier of a container in the backing store
//! - [`ContainerKind`] - Scope-class a container label is unique within
//!
//! # Validation
//!
//! These types enforce validity at construction time. Identifiers are UUIDs
//! and are normalized to their hyphenated lowercase form.
//!
//! # Examples
//!
//! ```
//! use pathbind::core::types::{ContainerKind, ItemId};
//!
//! let id = ItemId::parse("6F9619FF-8B86-D011-B42D-00CF4FC964FF").unwrap();
//! assert_eq!(id.to_string(), "6f9619ff-8b86-d011-b42d-00cf4fc964ff");
//! assert_eq!(id.short(8), "6f9619ff");
//!
//! assert!(ItemId::parse("not-a-uuid").is_err());
//! assert!(ContainerKind::new("").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    #[error("invalid container id: {0}")]
    InvalidContainerId(String),

    #[error("invalid container kind: {0}")]
    InvalidKind(String),
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $err:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier from its textual form.
            ///
            /// # Errors
            ///
            #[doc = concat!("Returns `TypeError::", stringify!($err), "` if the text is not a UUID.")]
            pub fn parse(s: &str) -> Result<Self, TypeError> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| TypeError::$err(s.to_string()))
            }

            /// The first `n` characters of the hyphenated form.
            pub fn short(&self, n: usize) -> String {
                self.to_string().chars().take(n).collect()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::str::FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }
    };
}

uuid_id!(
    /// Identifier of an item.
    ///
    /// Items are the individually addressable units that get bound into
    /// containers under an alias.
    ItemId,
    InvalidItemId
);

uuid_id!(
    /// Identifier of a container.
    ///
    /// Alias metadata on items is keyed by the container id, so renaming a
    /// container's label does not disturb the aliases bound inside it.
    ContainerId,
    InvalidContainerId
);

/// The scope-class of a container.
///
/// Container labels are unique per kind; two containers of different kinds
/// may share a label and are resolved independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContainerKind(String);

impl ContainerKind {
    /// The kind used when none is configured.
    pub const DEFAULT: &'static str = "core";

    /// Create a validated container kind.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidKind` if the kind is empty or contains
    /// whitespace or control characters.
    pub fn new(kind: impl Into<String>) -> Result<Self, TypeError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(TypeError::InvalidKind("kind cannot be empty".into()));
        }
        if kind.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidKind(format!(
                "kind cannot contain whitespace: {kind:?}"
            )));
        }
        Ok(Self(kind))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ContainerKind {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl TryFrom<String> for ContainerKind {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContainerKind> for String {
    fn from(kind: ContainerKind) -> Self {
        kind.0
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
