//! Error/log adapter.
//!
//! Converts resolver failures and per-call traces into [`DiagnosticRecord`]s
//! and sends them through a severity filter to one or more sinks. The default
//! sink forwards to the `log` facade; hosts and tests that need to inspect
//! diagnostics attach a [`MemorySink`].
//!
//! Every failure record carries the originating operation name, the
//! reference involved and the backend-reported message.

mod record;
mod sink;

pub use record::{DiagnosticRecord, RecordLevel, Severity};
pub use sink::{DiagnosticSink, LogSink, MemorySink};

use std::borrow::Cow;
use std::sync::Arc;

use crate::errors::{FailureScope, ResolverError};

/// Severity-filtered diagnostic channel.
#[derive(Clone)]
pub struct Diagnostics {
    severity: Severity,
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl Diagnostics {
    /// Channel forwarding to the `log` facade.
    pub fn new(severity: Severity) -> Self {
        Self::with_sinks(severity, vec![Arc::new(LogSink)])
    }

    pub fn with_sinks(severity: Severity, sinks: Vec<Arc<dyn DiagnosticSink>>) -> Self {
        Self { severity, sinks }
    }

    pub fn add_sink(&mut self, sink: Arc<dyn DiagnosticSink>) {
        self.sinks.push(sink);
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Whether per-call entry markers are emitted.
    pub fn is_tracing(&self) -> bool {
        self.severity == Severity::Debug
    }

    /// Per-call entry marker. Debug severity only.
    pub fn trace(&self, operation: impl Into<Cow<'static, str>>, subject: Option<&str>) {
        if self.is_tracing() {
            self.emit(DiagnosticRecord::trace(operation, subject));
        }
    }

    pub fn info(&self, operation: impl Into<Cow<'static, str>>, message: impl Into<String>) {
        self.emit(DiagnosticRecord {
            level: RecordLevel::Info,
            operation: operation.into(),
            subject: None,
            marker: None,
            message: message.into(),
        });
    }

    /// Report a failure of `operation` on `subject` before it propagates.
    pub fn report(
        &self,
        operation: impl Into<Cow<'static, str>>,
        subject: &str,
        error: &ResolverError,
    ) {
        let level = match error.scope() {
            FailureScope::Reference => RecordLevel::Warn,
            FailureScope::Operation | FailureScope::Chain => RecordLevel::Error,
        };

        self.emit(DiagnosticRecord {
            level,
            operation: operation.into(),
            subject: Some(error.reference().unwrap_or(subject).to_string()),
            marker: Some(error.marker()),
            message: error.to_string(),
        });
    }

    fn emit(&self, record: DiagnosticRecord) {
        if !record.level.passes(self.severity) {
            return;
        }
        for sink in &self.sinks {
            sink.emit(&record);
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Severity::default())
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("severity", &self.severity)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
