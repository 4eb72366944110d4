//! Error types for catalog handling and invocation building.

use std::path::PathBuf;

use thiserror::Error;

/// Sweep-wide error type.
#[derive(Error, Debug)]
pub enum SweepError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file could not be read
    #[error("Failed to read catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog file is not valid JSON for the expected shape
    #[error("Catalog parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A case is missing a field and the base record does not supply it
    #[error("Case {index} has no value for `{field}` and the base record does not supply one")]
    IncompleteCase { index: usize, field: &'static str },

    /// Flag name that does not look like a command-line flag
    #[error("Profile `{profile}`: `{flag}` is not a flag (expected a leading '-')")]
    InvalidFlag { profile: String, flag: String },

    /// Flag owned by the invocation builder
    #[error("Profile `{profile}`: `{flag}` is derived from the case and cannot be overridden")]
    ReservedFlag { profile: String, flag: String },

    /// Two profiles share a name
    #[error("Duplicate profile name: {0}")]
    DuplicateProfile(String),

    /// Profile name lookup failed
    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    /// Profile with an empty name
    #[error("Profile names must not be empty")]
    EmptyProfileName,

    /// Suppression index past the end of the case catalog
    #[error("Profile `{profile}` suppresses case {index}, but only {cases} cases exist")]
    CaseOutOfRange {
        profile: String,
        index: usize,
        cases: usize,
    },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, SweepError>;
