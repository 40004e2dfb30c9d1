//! Error handling module for cp2k-kinds
//!
//! Provides the library error type using thiserror. Variant incompatibility
//! and empty selections are not errors: they are rendered, never returned.

use thiserror::Error;

use crate::types::CatalogKind;

/// Main error type for cp2k-kinds
#[derive(Error, Debug)]
pub enum KindsError {
    /// IO errors (library files, configuration files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The data layer could not deliver a catalog, metadata or variant table
    #[error("Failed to fetch {kind} `{name}`: {reason}")]
    Fetch {
        kind: CatalogKind,
        name: String,
        reason: String,
    },

    /// Unknown catalog entry, or an entry that does not cover an element
    #[error("Not found: {0}")]
    NotFound(String),

    /// Variant tag not of the form `q<integer>`
    #[error("Malformed variant tag `{0}` (expected `q` followed by an integer)")]
    MalformedTag(String),

    /// Unknown element symbol or atomic number out of range
    #[error("Invalid element: {0}")]
    InvalidElement(String),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for cp2k-kinds operations
pub type Result<T> = std::result::Result<T, KindsError>;

// Convenient error constructors
impl KindsError {
    /// Create a fetch error for a catalog entry
    pub fn fetch(kind: CatalogKind, name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            kind,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a malformed tag error
    pub fn malformed_tag(tag: impl Into<String>) -> Self {
        Self::MalformedTag(tag.into())
    }

    /// Create an invalid element error
    pub fn invalid_element(msg: impl Into<String>) -> Self {
        Self::InvalidElement(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }

    /// Whether this error came from the data layer (network, missing entry, bad payload)
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::NotFound(_))
    }
}
