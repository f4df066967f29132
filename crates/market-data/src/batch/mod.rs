//! Batch coordination across the market types of one source.
//!
//! The coordinator drives, for each market type:
//! 1. Resolve the field mapping
//! 2. Fetch the raw table through the adapter
//! 3. Normalize it
//!
//! Any failure is recorded against that market type and the batch moves on.
//! Every market type is attempted at most once.

mod outcome;

pub use outcome::{Batch, MarketFailure};

use futures::stream::{self, StreamExt};
use log::{info, warn};

use crate::catalog;
use crate::errors::SnapshotError;
use crate::mapping::FieldMapper;
use crate::models::{CanonicalTable, MarketSource, RunContext};
use crate::normalize::Normalizer;
use crate::source::SourceAdapter;

/// Runs one batch per source.
#[derive(Clone, Debug)]
pub struct MarketBatchCoordinator {
    context: RunContext,
    normalizer: Normalizer,
    max_concurrency: usize,
    market_types: Option<Vec<String>>,
}

impl MarketBatchCoordinator {
    /// Create a sequential coordinator for the given run context.
    pub fn new(context: RunContext) -> Self {
        Self {
            context,
            normalizer: Normalizer::new(),
            max_concurrency: 1,
            market_types: None,
        }
    }

    /// Fetch up to `max_concurrency` market types at once.
    ///
    /// Results keep catalog order regardless of completion order.
    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Restrict the batch to these market type keys instead of the whole catalog.
    ///
    /// Keys unknown to a source are reported as configuration failures.
    /// Repeated keys are attempted once, at their first position.
    pub fn with_market_types(mut self, keys: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.trim().to_string();
            if !key.is_empty() && !unique.contains(&key) {
                unique.push(key);
            }
        }
        self.market_types = if unique.is_empty() { None } else { Some(unique) };
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Attempt every configured market type of `source`.
    ///
    /// Never fails as a whole: per-market-type errors end up in
    /// [`Batch::failures`].
    pub async fn run_batch(
        &self,
        source: MarketSource,
        adapter: &SourceAdapter,
        mapper: &FieldMapper,
    ) -> Batch {
        let keys = self.keys_for(source);
        info!(
            "Starting {} batch for {} ({} market types)",
            source,
            self.context.trade_date,
            keys.len()
        );

        let outcomes: Vec<(String, Result<CanonicalTable, SnapshotError>)> = stream::iter(keys)
            .map(|key| async move {
                let result = self.fetch_market_type(source, &key, adapter, mapper).await;
                (key, result)
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut batch = Batch::new(source, self.context.trade_date);
        for (key, result) in outcomes {
            match result {
                Ok(table) => {
                    info!(
                        "Fetched {} rows for {}/{}",
                        table.len(),
                        source,
                        key
                    );
                    batch.tables.push(table);
                }
                Err(e) => {
                    warn!(
                        "Skipping {}/{} after {} failure: {}",
                        source,
                        key,
                        e.failure_kind(),
                        e
                    );
                    batch.failures.push(MarketFailure::from_error(&key, &e));
                }
            }
        }

        info!(
            "Finished {} batch: {} succeeded, {} failed",
            source,
            batch.tables.len(),
            batch.failures.len()
        );
        batch
    }

    /// Fetch and normalize a single market type.
    pub async fn fetch_market_type(
        &self,
        source: MarketSource,
        market_type: &str,
        adapter: &SourceAdapter,
        mapper: &FieldMapper,
    ) -> Result<CanonicalTable, SnapshotError> {
        if adapter.source() != source {
            return Err(SnapshotError::Configuration(format!(
                "adapter for {} cannot serve {}",
                adapter.source(),
                source
            )));
        }

        let mapping = mapper.resolve(source, market_type)?;
        let raw = adapter
            .fetch_raw(mapping.market_type, &mapping, &self.context)
            .await?;
        self.normalizer.normalize(&raw, &mapping, &self.context)
    }

    fn keys_for(&self, source: MarketSource) -> Vec<String> {
        match &self.market_types {
            Some(keys) => keys.clone(),
            None => catalog::market_types(source)
                .iter()
                .map(|d| d.key.clone())
                .collect(),
        }
    }
}
