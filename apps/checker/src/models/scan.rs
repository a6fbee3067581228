use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Key under which the last successful scan date is persisted.
pub const SCAN_STORAGE_KEY: &str = "greecode_ats_last_scan";

/// Fixed on-disk date format. Values are compared by string equality, never re-parsed.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Persisted state of the daily scan gate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub last_scan_date: Option<String>,
}

impl ScanRecord {
    pub fn scanned_on(date: NaiveDate) -> Self {
        Self {
            last_scan_date: Some(date_key(date)),
        }
    }

    /// True only when the stored value is exactly `today_key`.
    pub fn is_exhausted_for(&self, today_key: &str) -> bool {
        self.last_scan_date.as_deref() == Some(today_key)
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}
