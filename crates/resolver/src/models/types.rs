use chrono::{DateTime, Utc};

/// Modification time of an asset, when one is known
pub type Timestamp = Option<DateTime<Utc>>;
