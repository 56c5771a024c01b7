use chrono::{Duration, NaiveDate};

/// Date range bounding all date-sensitive fetches for one pipeline run.
///
/// The report covers "yesterday" relative to the run date, with a configurable
/// lookback for series that need a few days of history (e.g. index bars).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RunWindow {
    pub fn for_run_date(run_date: NaiveDate, lookback_days: i64) -> Self {
        Self {
            start: run_date - Duration::days(lookback_days),
            end: run_date - Duration::days(1),
        }
    }

    /// Compact form used by provider query params and notification subjects.
    pub fn start_compact(&self) -> String {
        self.start.format("%Y%m%d").to_string()
    }

    pub fn end_compact(&self) -> String {
        self.end.format("%Y%m%d").to_string()
    }
}
