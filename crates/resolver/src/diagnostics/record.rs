use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Configured diagnostic severity.
///
/// `Informational` passes notices, warnings and errors; `Debug` additionally
/// passes per-call entry markers and object-lifecycle traces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    #[serde(alias = "info")]
    Informational,
    Debug,
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" | "informational" => Ok(Self::Informational),
            "debug" => Ok(Self::Debug),
            other => Err(format!("Unknown diagnostic severity '{}'", other)),
        }
    }
}

/// Level of a single diagnostic record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum RecordLevel {
    /// Per-call entry markers and lifecycle events. Debug severity only.
    Trace,
    Info,
    Warn,
    Error,
}

impl RecordLevel {
    pub fn passes(&self, severity: Severity) -> bool {
        match self {
            Self::Trace => severity == Severity::Debug,
            _ => true,
        }
    }

    pub fn as_log_level(&self) -> log::Level {
        match self {
            Self::Trace => log::Level::Debug,
            Self::Info => log::Level::Info,
            Self::Warn => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

/// One structured diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub level: RecordLevel,
    /// Originating operation, e.g. `resolve` or `get_extension`.
    pub operation: Cow<'static, str>,
    /// Entity reference or asset path involved, if any.
    pub subject: Option<String>,
    /// Stable failure marker, e.g. `entityResolutionError`.
    pub marker: Option<&'static str>,
    pub message: String,
}

impl DiagnosticRecord {
    pub fn trace(operation: impl Into<Cow<'static, str>>, subject: Option<&str>) -> Self {
        Self {
            level: RecordLevel::Trace,
            operation: operation.into(),
            subject: subject.map(str::to_string),
            marker: None,
            message: String::new(),
        }
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ASSETIO_RESOLVER: {}", self.operation)?;
        if let Some(subject) = &self.subject {
            write!(f, "('{}')", subject)?;
        }
        if let Some(marker) = self.marker {
            write!(f, " {}", marker)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}
