//! Error types for the Iconify engine.

use thiserror::Error;

/// Top-level error type for the Iconify engine.
#[derive(Debug, Error)]
pub enum IconifyError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error(transparent)]
    IconSet(#[from] IconSetError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors while parsing an icon name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Empty icon name")]
    Empty,

    #[error("Too many segments in icon name: {value}")]
    TooManySegments { value: String },

    #[error("Missing prefix in icon name: {value}")]
    MissingPrefix { value: String },

    #[error("Invalid characters in {segment} '{value}'")]
    InvalidCharacters { segment: &'static str, value: String },
}

/// Errors while parsing or expanding an icon set document.
#[derive(Debug, Error)]
pub enum IconSetError {
    #[error("Invalid icon set JSON: {0}")]
    Json(String),

    #[error("Icon set is missing a prefix")]
    MissingPrefix,

    #[error("Invalid icon name: {name}")]
    InvalidName { name: String },

    #[error("Icon {name} has no body")]
    MissingBody { name: String },

    #[error("Alias {name} references unknown icon {parent}")]
    MissingParent { name: String, parent: String },

    #[error("Circular alias reference: {}", .chain.join(" -> "))]
    CircularAlias { chain: Vec<String> },

    #[error("Alias chain for {name} exceeds maximum depth ({depth})")]
    MaxDepthExceeded { name: String, depth: usize },
}

/// Errors reported by the API loading layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("No API provider configured for '{provider}'")]
    UnknownProvider { provider: String },

    #[error("API provider '{provider}' has no resources")]
    NoResources { provider: String },

    #[error("Query for {prefix} failed on every host")]
    AllHostsFailed { prefix: String },

    #[error("Query aborted: {reason}")]
    Aborted { reason: String },
}

/// Errors from a key-value backing store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Storage is read-only")]
    ReadOnly,

    #[error("Storage quota exceeded while writing {key}")]
    QuotaExceeded { key: String },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}
