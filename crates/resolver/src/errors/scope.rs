/// How far a failure reaches.
///
/// Used by the diagnostics adapter to pick a record level and by callers that
/// walk several references to decide whether to keep going.
///
/// # Behavior Summary
///
/// | Scope | Sibling references continue? | Diagnostic level |
/// |-------|------------------------------|------------------|
/// | `Operation` | No | Error |
/// | `Reference` | Yes | Warn |
/// | `Chain` | No (whole chain abandoned) | Error |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureScope {
    /// The invoked operation cannot succeed regardless of input, e.g. a
    /// missing capability or an entity reference used as a write destination.
    Operation,

    /// Only the reference being resolved failed. Unrelated references in the
    /// same context may still resolve.
    Reference,

    /// A nested resolution chain revisited itself and must be abandoned.
    Chain,
}
