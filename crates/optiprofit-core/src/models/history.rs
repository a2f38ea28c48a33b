//! History record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::{CalcResult, ParsedInput};

/// One completed check as kept in the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Caller-assigned identifier.
    pub id: String,

    /// Creation time in milliseconds since the Unix epoch.
    pub created_at: i64,

    /// The trimmed text the user entered.
    pub input: String,

    /// Extracted fields.
    pub parsed: ParsedInput,

    /// Calculated figures.
    pub result: CalcResult,
}

impl HistoryEntry {
    /// Creation time as a UTC timestamp, if it is in range.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }
}
