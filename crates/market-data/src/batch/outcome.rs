//! Batch results and failure diagnostics.

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::{FailureKind, SnapshotError};
use crate::models::{CanonicalTable, MarketSource};

/// Why one market type produced no table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketFailure {
    pub market_type: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl MarketFailure {
    pub fn from_error(market_type: &str, error: &SnapshotError) -> Self {
        Self {
            market_type: market_type.to_string(),
            kind: error.failure_kind(),
            reason: error.to_string(),
        }
    }
}

/// Result of one run over a source's market types.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub source: MarketSource,
    pub trade_date: NaiveDate,
    /// One table per successful market type, in attempt order
    pub tables: Vec<CanonicalTable>,
    pub failures: Vec<MarketFailure>,
}

impl Batch {
    pub fn new(source: MarketSource, trade_date: NaiveDate) -> Self {
        Self {
            source,
            trade_date,
            tables: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn attempted(&self) -> usize {
        self.tables.len() + self.failures.len()
    }

    /// No market type failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every attempted market type failed (distinct from "nothing attempted").
    pub fn all_failed(&self) -> bool {
        self.tables.is_empty() && !self.failures.is_empty()
    }

    pub fn table(&self, market_type: &str) -> Option<&CanonicalTable> {
        self.tables.iter().find(|t| t.market_type == market_type)
    }

    pub fn failure(&self, market_type: &str) -> Option<&MarketFailure> {
        self.failures.iter().find(|f| f.market_type == market_type)
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        let succeeded = self
            .tables
            .iter()
            .map(|t| format!("{}: OK ({} rows)", t.market_type, t.len()));
        let failed = self
            .failures
            .iter()
            .map(|f| format!("{}: FAILED [{}] {}", f.market_type, f.kind, f.reason));
        succeeded.chain(failed).collect::<Vec<_>>().join("; ")
    }
}
