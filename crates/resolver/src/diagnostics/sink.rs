use std::sync::{Mutex, MutexGuard};

use log::warn;

use super::record::{DiagnosticRecord, RecordLevel};

/// Destination for diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, record: &DiagnosticRecord);
}

/// Forwards records to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, record: &DiagnosticRecord) {
        log::log!(
            target: "assetio_resolver::diagnostics",
            record.level.as_log_level(),
            "{}",
            record
        );
    }
}

/// Keeps records in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_records(&self) -> MutexGuard<'_, Vec<DiagnosticRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| {
            warn!("Diagnostic sink mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Snapshot of every record so far.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.lock_records().clone()
    }

    /// Remove and return every record so far.
    pub fn take(&self) -> Vec<DiagnosticRecord> {
        std::mem::take(&mut *self.lock_records())
    }

    /// Operations of the trace records, in order.
    pub fn traced_operations(&self) -> Vec<String> {
        self.lock_records()
            .iter()
            .filter(|r| r.level == RecordLevel::Trace)
            .map(|r| r.operation.to_string())
            .collect()
    }

    /// Whether any record carries `marker`.
    pub fn has_marker(&self, marker: &str) -> bool {
        self.lock_records().iter().any(|r| r.marker == Some(marker))
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, record: &DiagnosticRecord) {
        self.lock_records().push(record.clone());
    }
}
