//! Error types for the stage crate.

use std::str::Utf8Error;

use assetio_resolver::ResolverError;
use thiserror::Error;

/// Result type alias for stage operations.
pub type Result<T> = std::result::Result<T, StageError>;

/// Errors raised while opening and composing a stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// A resolver operation failed; it has already been reported to the
    /// resolver's diagnostics channel.
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// A layer identifier resolved to nothing.
    #[error("Cannot resolve layer '{0}'")]
    LayerNotFound(String),

    /// The layer's extension names a format this reader cannot parse.
    #[error("Unsupported layer format '{extension}' for '{identifier}'")]
    UnsupportedFormat { identifier: String, extension: String },

    #[error("Layer '{identifier}' is not valid UTF-8: {source}")]
    Utf8 {
        identifier: String,
        #[source]
        source: Utf8Error,
    },

    #[error("Failed to parse '{identifier}': {message}")]
    Parse { identifier: String, message: String },

    /// A reference names a prim the referenced layer does not contain.
    #[error("Reference target '{target}' not found in '{identifier}'")]
    MissingTarget { identifier: String, target: String },
}

impl StageError {
    pub(crate) fn parse(identifier: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            identifier: identifier.to_string(),
            message: message.into(),
        }
    }
}
