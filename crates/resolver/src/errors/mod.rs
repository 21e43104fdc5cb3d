//! Error types and failure scoping for the resolver crate.
//!
//! This module provides:
//! - [`ResolverError`]: The main error enum for every resolver operation
//! - [`BackendError`] / [`BackendErrorCode`]: Failures reported by a manager backend
//! - [`FailureScope`]: How far a failure reaches (one operation, one reference, a chain)

mod backend;
mod scope;

pub use backend::{BackendError, BackendErrorCode};
pub use scope::FailureScope;

use std::path::PathBuf;

use thiserror::Error;

use crate::manager::Capability;

/// Type alias for Result using the resolver error type.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Errors that can occur during identifier creation, resolution and asset access.
///
/// Each variant maps to a [`FailureScope`] via [`scope`](Self::scope) and to a
/// stable diagnostic marker via [`marker`](Self::marker). No variant is ever
/// retried by the resolver itself.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The bound manager does not advertise a capability the operation needs.
    #[error("Manager '{manager}' does not support the '{capability}' capability")]
    Capability {
        /// Identifier of the manager that lacks the capability
        manager: String,
        /// The missing capability
        capability: Capability,
    },

    /// The manager failed to resolve a specific entity reference.
    #[error("Failed to resolve '{reference}': {code}: {message}")]
    Resolution {
        /// The literal entity reference that was being resolved
        reference: String,
        /// Backend classification of the failure
        code: BackendErrorCode,
        /// The backend-reported message
        message: String,
    },

    /// A resolution chain revisited a reference that is still in progress.
    #[error("Reference cycle detected at '{reference}' (chain: {})", .chain.join(" -> "))]
    Cycle {
        /// The reference that closed the cycle
        reference: String,
        /// The chain of references in progress, outermost first
        chain: Vec<String>,
    },

    /// Entity references can never be used as write destinations.
    #[error("Writing to entity reference '{reference}' is not supported")]
    WriteUnsupported {
        /// The entity reference used as a destination
        reference: String,
    },

    /// A file-system operation on a resolved location failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The backend configuration could not be read or understood.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The configuration names a manager no factory knows how to build.
    #[error("Unknown manager: {0}")]
    UnknownManager(String),
}

impl ResolverError {
    /// Builds a resolution error from a backend failure for `reference`.
    pub fn from_backend(reference: impl Into<String>, error: BackendError) -> Self {
        Self::Resolution {
            reference: reference.into(),
            code: error.code,
            message: error.message,
        }
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns how far this failure reaches.
    ///
    /// - [`FailureScope::Operation`]: the invoked operation fails as a whole
    /// - [`FailureScope::Reference`]: only this reference fails; siblings are unaffected
    /// - [`FailureScope::Chain`]: the whole nested resolution chain is abandoned
    ///
    /// # Examples
    ///
    /// ```
    /// use assetio_resolver::errors::{FailureScope, ResolverError};
    ///
    /// let error = ResolverError::WriteUnsupported { reference: "bal:///cat".to_string() };
    /// assert_eq!(error.scope(), FailureScope::Operation);
    /// ```
    pub fn scope(&self) -> FailureScope {
        match self {
            Self::Capability { .. }
            | Self::WriteUnsupported { .. }
            | Self::Config(_)
            | Self::UnknownManager(_) => FailureScope::Operation,

            Self::Resolution { .. } | Self::Io { .. } => FailureScope::Reference,

            Self::Cycle { .. } => FailureScope::Chain,
        }
    }

    /// Stable marker written into diagnostic records for this failure.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Capability { .. } => "capabilityError",
            Self::Resolution { code, .. } => code.marker(),
            Self::Cycle { .. } => "referenceCycleError",
            Self::WriteUnsupported { .. } => "writeUnsupportedError",
            Self::Io { .. } => "ioError",
            Self::Config(_) => "configError",
            Self::UnknownManager(_) => "unknownManagerError",
        }
    }

    /// The reference or path this failure concerns, if any.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Self::Resolution { reference, .. }
            | Self::Cycle { reference, .. }
            | Self::WriteUnsupported { reference } => Some(reference),
            _ => None,
        }
    }
}
