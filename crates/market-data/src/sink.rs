//! Output contract for canonical tables.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::errors::SnapshotError;
use crate::models::{CanonicalTable, MarketSource};

/// Persists canonical tables.
///
/// Implementations decide the storage medium; the core only hands over
/// finished tables and never reads them back.
pub trait SnapshotSink: Send + Sync {
    /// Write one table, returning where it was written.
    fn write(&self, table: &CanonicalTable) -> Result<PathBuf, SnapshotError>;
}

/// File name of a table: `{source}_market_{category}_{YYYYMMDD}.csv`.
///
/// ```
/// use chrono::NaiveDate;
/// use quotesnap_market_data::models::MarketSource;
/// use quotesnap_market_data::sink::snapshot_file_name;
///
/// let date = NaiveDate::from_ymd_opt(2024, 12, 17).unwrap();
/// assert_eq!(
///     snapshot_file_name(MarketSource::Sse, "equity", date),
///     "sse_market_equity_20241217.csv"
/// );
/// ```
pub fn snapshot_file_name(source: MarketSource, market_type: &str, trade_date: NaiveDate) -> String {
    format!(
        "{}_market_{}_{}.csv",
        source.id(),
        market_type,
        trade_date.format("%Y%m%d")
    )
}

/// Shorthand for [`snapshot_file_name`] on a finished table.
pub fn table_file_name(table: &CanonicalTable) -> String {
    snapshot_file_name(table.source, &table.market_type, table.trade_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_szse_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        assert_eq!(
            snapshot_file_name(MarketSource::Szse, "bond_repo", date),
            "szse_market_bond_repo_20250102.csv"
        );
    }
}
