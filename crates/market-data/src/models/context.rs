use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

/// Timezone the exchanges publish in. Used when no other zone is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Shanghai;

/// Per-run context shared by every market type of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunContext {
    /// The as-of date every record of the batch carries
    pub trade_date: NaiveDate,
}

impl RunContext {
    pub fn new(trade_date: NaiveDate) -> Self {
        Self { trade_date }
    }

    /// Today's date in the given timezone, evaluated once.
    pub fn today_in(tz: Tz) -> Self {
        Self::new(Utc::now().with_timezone(&tz).date_naive())
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::today_in(DEFAULT_TIMEZONE)
    }
}
