use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One calendar day's task list and free-text summary.
///
/// The date is stored as a plain calendar date, so "normalized to midnight"
/// holds by construction. At most one `Day` may exist per date; the engine
/// enforces that invariant when creating days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    /// Unique ID for internal references
    pub id: Uuid,
    /// Calendar date this day represents
    pub date: NaiveDate,
    /// Free-text note for the day
    #[serde(default)]
    pub summary: String,
    /// Days created by debug tooling; purged at every startup
    #[serde(default)]
    pub is_ephemeral: bool,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            summary: String::new(),
            is_ephemeral: false,
        }
    }

    /// Create a day flagged for purge at next startup
    pub fn ephemeral(date: NaiveDate) -> Self {
        let mut day = Self::new(date);
        day.is_ephemeral = true;
        day
    }
}

/// Check whether a date falls on a Saturday or Sunday
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
