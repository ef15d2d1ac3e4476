use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored in the time column when an interview was scheduled without a
/// clock time. Kept as a literal string for compatibility with rows
/// written by earlier deployments.
pub const NO_TIME: &str = "No time specified";

/// Category substituted when a time-shaped value is found in the
/// category column (see the repair rule in `hirewire-store`).
pub const DEFAULT_CATEGORY: &str = "Interview";

/// One scheduled interview, as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interview {
    /// Assigned by the store on creation; stable for the record's life.
    pub id: i64,
    /// Discord user id of the creator. Only this identity may mutate or
    /// delete the record.
    pub owner_id: i64,
    /// Display name captured at creation time; not re-synced on rename.
    pub owner_name: String,
    pub date: NaiveDate,
    /// Validated `HH:MM`, the [`NO_TIME`] sentinel, or `None` on rows
    /// migrated from the pre-time schema.
    pub time: Option<String>,
    pub category: String,
    pub description: String,
    /// RFC 3339, set once at creation.
    pub created_at: String,
}

impl Interview {
    /// The clock time to display, if the record carries a real one.
    pub fn clock_time(&self) -> Option<&str> {
        match self.time.as_deref() {
            Some(t) if !t.is_empty() && t != NO_TIME => Some(t),
            _ => None,
        }
    }
}

/// One row of the per-owner ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerCount {
    pub owner_name: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: Option<&str>) -> Interview {
        Interview {
            id: 1,
            owner_id: 10,
            owner_name: "alex".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: time.map(String::from),
            category: "Technical".into(),
            description: "System Design".into(),
            created_at: "2024-02-01T10:00:00Z".into(),
        }
    }

    #[test]
    fn clock_time_skips_sentinel_and_empty() {
        assert_eq!(record(Some("14:30")).clock_time(), Some("14:30"));
        assert_eq!(record(Some(NO_TIME)).clock_time(), None);
        assert_eq!(record(Some("")).clock_time(), None);
        assert_eq!(record(None).clock_time(), None);
    }
}
