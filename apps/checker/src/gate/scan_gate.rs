use std::fmt::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::DEFAULT_DATE_LABEL_FORMAT;
use crate::gate::clock::Clock;
use crate::gate::store::ScanStore;
use crate::models::scan::{date_key, ScanRecord, SCAN_STORAGE_KEY};

/// A calendar date together with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateLabel {
    pub date: NaiveDate,
    pub label: String,
}

impl DateLabel {
    pub fn new(date: NaiveDate, label: impl Into<String>) -> Self {
        Self {
            date,
            label: label.into(),
        }
    }
}

impl fmt::Display for DateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Per-device daily usage limiter over a single persisted key.
///
/// Storage faults never block the user: an unreadable store counts as
/// "no record" and a failed write is logged and ignored.
pub struct ScanGate {
    // Held across every read-then-write so check-and-mark is atomic.
    store: Mutex<Box<dyn ScanStore>>,
    clock: Arc<dyn Clock>,
    label_format: String,
}

impl ScanGate {
    pub fn new(store: Box<dyn ScanStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(store),
            clock,
            label_format: DEFAULT_DATE_LABEL_FORMAT.to_string(),
        }
    }

    /// Overrides the strftime format used by `next_scan_date`.
    /// Formats that cannot render a plain date (malformed, or needing time or
    /// offset fields) are ignored with a warning.
    pub fn with_label_format(mut self, format: &str) -> Self {
        let sample_date = self.clock.today();
        if render_label(sample_date, format).is_some() {
            self.label_format = format.to_string();
        } else {
            warn!("Ignoring date label format '{format}', it cannot render a date");
        }
        self
    }

    pub fn can_scan_today(&self) -> bool {
        let store = self.lock_store();
        !self
            .read_record(&**store)
            .is_exhausted_for(&date_key(self.clock.today()))
    }

    /// Records today as used. Calling it again the same day changes nothing.
    pub fn mark_scan_completed(&self) {
        let store = self.lock_store();
        self.write_day(&**store, self.clock.today());
    }

    /// Label for tomorrow. Independent of the persisted record.
    pub fn next_scan_date(&self) -> DateLabel {
        self.label_after(self.clock.today())
    }

    /// Checks and marks in one critical section. Two concurrent callers on the
    /// same day can never both succeed. On refusal returns the next eligible date.
    pub fn try_claim_today(&self) -> Result<(), DateLabel> {
        // One clock read per claim; a midnight rollover cannot split check and mark.
        let today = self.clock.today();
        let store = self.lock_store();
        if self.read_record(&**store).is_exhausted_for(&date_key(today)) {
            return Err(self.label_after(today));
        }
        self.write_day(&**store, today);
        Ok(())
    }

    /// Current persisted record, read fail-open.
    pub fn record(&self) -> ScanRecord {
        let store = self.lock_store();
        self.read_record(&**store)
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, Box<dyn ScanStore>> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn label_after(&self, today: NaiveDate) -> DateLabel {
        let tomorrow = today.succ_opt().unwrap_or(today);
        let label = render_label(tomorrow, &self.label_format)
            .or_else(|| render_label(tomorrow, DEFAULT_DATE_LABEL_FORMAT))
            .unwrap_or_else(|| date_key(tomorrow));
        DateLabel::new(tomorrow, label)
    }

    fn read_record(&self, store: &dyn ScanStore) -> ScanRecord {
        match store.get(SCAN_STORAGE_KEY) {
            Ok(last_scan_date) => ScanRecord { last_scan_date },
            Err(e) => {
                warn!("Scan store unreadable, treating as no record: {e}");
                ScanRecord::default()
            }
        }
    }

    fn write_day(&self, store: &dyn ScanStore, day: NaiveDate) {
        let today = date_key(day);
        match store.set(SCAN_STORAGE_KEY, &today) {
            Ok(()) => info!("Marked scan completed for {today}"),
            Err(e) => warn!("Failed to persist scan date {today}, continuing: {e}"),
        }
    }
}

/// Renders `date` with a strftime `format`, or `None` if the format cannot be
/// applied to a date without a time.
fn render_label(date: NaiveDate, format: &str) -> Option<String> {
    let mut label = String::new();
    write!(label, "{}", date.format(format)).ok()?;
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::gate::clock::FixedClock;
    use crate::gate::store::MemoryStore;

    struct BrokenStore;

    impl ScanStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disabled".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }
    }

    /// Moves one day forward on every read, as if each read crossed midnight.
    struct RollingClock {
        start: NaiveDate,
        reads: std::sync::atomic::AtomicU64,
    }

    impl Clock for RollingClock {
        fn today(&self) -> NaiveDate {
            let n = self.reads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.start + chrono::Days::new(n)
        }
    }

    fn rolling_gate(start: NaiveDate, store: MemoryStore) -> ScanGate {
        let clock = Arc::new(RollingClock {
            start,
            reads: std::sync::atomic::AtomicU64::new(0),
        });
        ScanGate::new(Box::new(store), clock)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn gate_at(today: NaiveDate) -> (ScanGate, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(today));
        let gate = ScanGate::new(Box::new(MemoryStore::new()), clock.clone());
        (gate, clock)
    }

    #[test]
    fn test_fresh_store_allows_scan() {
        let (gate, _) = gate_at(date(2024, 3, 7));
        assert!(gate.can_scan_today());
        assert_eq!(gate.record(), ScanRecord::default());
    }

    #[test]
    fn test_mark_blocks_rest_of_day_then_reopens() {
        let (gate, clock) = gate_at(date(2024, 3, 7));
        gate.mark_scan_completed();
        assert!(!gate.can_scan_today());
        assert!(!gate.can_scan_today());

        clock.advance_days(1);
        assert!(gate.can_scan_today());
    }

    #[test]
    fn test_mark_is_idempotent_within_day() {
        let (gate, _) = gate_at(date(2024, 3, 7));
        gate.mark_scan_completed();
        let once = gate.record();
        gate.mark_scan_completed();
        assert_eq!(gate.record(), once);
        assert_eq!(once.last_scan_date.as_deref(), Some("2024-03-07"));
    }

    #[test]
    fn test_record_overwritten_not_appended() {
        let (gate, clock) = gate_at(date(2024, 3, 7));
        gate.mark_scan_completed();
        clock.advance_days(3);
        gate.mark_scan_completed();
        assert_eq!(gate.record().last_scan_date.as_deref(), Some("2024-03-10"));
    }

    #[test]
    fn test_clock_moving_backwards_reopens_gate() {
        // Equality only: any other stored date permits a scan.
        let (gate, clock) = gate_at(date(2024, 3, 7));
        gate.mark_scan_completed();
        clock.set(date(2024, 3, 6));
        assert!(gate.can_scan_today());
    }

    #[test]
    fn test_next_scan_date_is_tomorrow_regardless_of_state() {
        let (gate, clock) = gate_at(date(2024, 12, 31));
        let before = gate.next_scan_date();
        assert_eq!(before.date, date(2025, 1, 1));
        assert_eq!(before.label, "1/1/2025");

        gate.mark_scan_completed();
        assert_eq!(gate.next_scan_date(), before);

        clock.advance_days(10);
        assert_eq!(gate.next_scan_date().date, date(2025, 1, 11));
    }

    #[test]
    fn test_custom_label_format() {
        let (gate, _) = gate_at(date(2024, 3, 7));
        let gate = gate.with_label_format("%A, %B %-d");
        assert_eq!(gate.next_scan_date().label, "Friday, March 8");
    }

    #[test]
    fn test_malformed_label_format_falls_back() {
        let (gate, _) = gate_at(date(2024, 3, 7));
        let gate = gate.with_label_format("%Q");
        assert_eq!(gate.next_scan_date().label, "3/8/2024");
    }

    #[test]
    fn test_time_fields_in_label_format_fall_back() {
        let (gate, _) = gate_at(date(2024, 3, 7));
        let gate = gate.with_label_format("%m/%d %H:%M");
        assert_eq!(gate.next_scan_date().label, "3/8/2024");

        let (gate, _) = gate_at(date(2024, 3, 7));
        let gate = gate.with_label_format("%Y-%m-%d %z");
        assert_eq!(gate.next_scan_date().label, "3/8/2024");
    }

    #[test]
    fn test_render_label_rejects_time_fields() {
        assert_eq!(render_label(date(2024, 3, 8), "%d.%m.%Y").as_deref(), Some("08.03.2024"));
        assert!(render_label(date(2024, 3, 8), "%H:%M").is_none());
        assert!(render_label(date(2024, 3, 8), "%Q").is_none());
    }

    #[test]
    fn test_try_claim_once_per_day() {
        let (gate, clock) = gate_at(date(2024, 3, 7));
        assert!(gate.try_claim_today().is_ok());
        let refused = gate.try_claim_today().unwrap_err();
        assert_eq!(refused.date, date(2024, 3, 8));

        clock.advance_days(1);
        assert!(gate.try_claim_today().is_ok());
    }

    #[test]
    fn test_try_claim_marks_the_day_it_checked() {
        let gate = rolling_gate(date(2024, 3, 7), MemoryStore::new());
        assert!(gate.try_claim_today().is_ok());
        assert_eq!(gate_record_date(&gate), Some("2024-03-07".to_string()));
    }

    #[test]
    fn test_try_claim_refusal_labels_day_after_checked_day() {
        let store = MemoryStore::new();
        store.set(SCAN_STORAGE_KEY, "2024-03-07").unwrap();
        let gate = rolling_gate(date(2024, 3, 7), store);
        let refused = gate.try_claim_today().unwrap_err();
        assert_eq!(refused.date, date(2024, 3, 8));
    }

    fn gate_record_date(gate: &ScanGate) -> Option<String> {
        gate.record().last_scan_date
    }

    #[test]
    fn test_try_claim_is_exclusive_across_threads() {
        let (gate, _) = gate_at(date(2024, 3, 7));
        let gate = Arc::new(gate);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                std::thread::spawn(move || gate.try_claim_today().is_ok())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_broken_store_fails_open() {
        let clock = Arc::new(FixedClock::new(date(2024, 3, 7)));
        let gate = ScanGate::new(Box::new(BrokenStore), clock);
        assert!(gate.can_scan_today());
        gate.mark_scan_completed();
        assert!(gate.can_scan_today());
        assert!(gate.try_claim_today().is_ok());
    }
}
