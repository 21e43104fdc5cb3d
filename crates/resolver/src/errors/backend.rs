use std::fmt;

use thiserror::Error;

/// Classification of a failure reported by a manager backend.
///
/// Display renders the camel-case marker that diagnostics carry, e.g.
/// `entityResolutionError`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BackendErrorCode {
    /// The entity does not exist, or has no location the manager can report.
    EntityResolutionError,
    /// The reference belongs to the manager but cannot be parsed.
    MalformedEntityReference,
    /// The reference is not one this manager recognizes.
    InvalidEntityReference,
    /// The entity exists but the caller may not access it.
    EntityAccessError,
    /// Any other internal backend fault.
    Unknown,
}

impl BackendErrorCode {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::EntityResolutionError => "entityResolutionError",
            Self::MalformedEntityReference => "malformedEntityReference",
            Self::InvalidEntityReference => "invalidEntityReference",
            Self::EntityAccessError => "entityAccessError",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BackendErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// A failure returned by a [`ManagerInterface`](crate::manager::ManagerInterface) call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct BackendError {
    pub code: BackendErrorCode,
    pub message: String,
}

impl BackendError {
    pub fn new(code: BackendErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::EntityResolutionError, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(BackendErrorCode::MalformedEntityReference, message)
    }
}
