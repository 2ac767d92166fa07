use std::path::PathBuf;
use thiserror::Error;

/// Input-contract violations. Diagnostics (`PC0001`, `PC0002`) are never
/// reported through this type.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("parts of `{name}` name different bases `{first}` and `{second}`")]
    ConflictingBase { name: String, first: String, second: String },
    #[error("inheritance cycle through `{name}`")]
    InheritanceCycle { name: String },
    /// A unit handed to [`crate::Rewriter`] that the table was not built from.
    #[error("type `{name}` is missing from the type table")]
    UnindexedType { name: String },
    #[error(transparent)]
    Options(#[from] ConfigError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("protocol interface name is empty")]
    EmptyInterface,
    #[error("`{0}` is not a legal identifier for a helper method")]
    InvalidHelper(String),
    #[error("`{0}` is not a legal prefix for storage fields")]
    InvalidStoragePrefix(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("at JSON path {pointer} → {message}")]
    Json { pointer: String, message: String },
}
