use std::path::PathBuf;
use std::sync::Arc;

use quotesnap_market_data::{
    Batch, FieldMapper, HttpTransport, JsonpSource, MarketBatchCoordinator, MarketSource,
    RunContext, SnapshotSink, SourceAdapter, TabularDownloadSource,
};
use quotesnap_storage_csv::CsvSnapshotSink;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("QUOTESNAP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(fmt::layer().with_target(true)).init();
    }
}

/// Outcome of one invocation across all selected sources.
#[derive(Debug, Default)]
pub struct RunReport {
    pub batches: Vec<Batch>,
    pub written: Vec<PathBuf>,
    pub write_failures: usize,
}

impl RunReport {
    /// Every attempted market type of every source failed to produce a file.
    pub fn all_failed(&self) -> bool {
        let attempted: usize = self.batches.iter().map(Batch::attempted).sum();
        attempted > 0 && self.written.is_empty()
    }
}

/// Production adapter for `source`, configured from `config`.
pub fn build_adapter(source: MarketSource, config: &Config) -> anyhow::Result<SourceAdapter> {
    let settings = config.source_settings(source);
    let adapter = match source {
        MarketSource::Sse => JsonpSource::new(settings)?.into(),
        MarketSource::Szse => TabularDownloadSource::new(settings, config.download_dir())?.into(),
    };
    Ok(adapter)
}

/// Adapter for `source` that sends its requests through `transport`.
pub fn build_adapter_with(
    source: MarketSource,
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> SourceAdapter {
    let settings = config.source_settings(source);
    match source {
        MarketSource::Sse => JsonpSource::with_transport(settings, transport).into(),
        MarketSource::Szse => {
            TabularDownloadSource::with_transport(settings, config.download_dir(), transport).into()
        }
    }
}

/// Fetch every selected source and write its tables.
pub async fn run(config: &Config) -> anyhow::Result<RunReport> {
    let mut adapters = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        adapters.push(build_adapter(*source, config)?);
    }
    run_with(config, adapters).await
}

pub async fn run_with(config: &Config, adapters: Vec<SourceAdapter>) -> anyhow::Result<RunReport> {
    let context = RunContext::today_in(config.timezone);
    tracing::info!("Trade date: {}", context.trade_date);

    let coordinator = MarketBatchCoordinator::new(context)
        .with_concurrency(config.concurrency)
        .with_market_types(config.market_types.clone());
    let mapper = FieldMapper::new();
    let sink = CsvSnapshotSink::new(&config.output_dir).with_header_style(config.header_style);

    let mut report = RunReport::default();
    for adapter in adapters {
        let source = adapter.source();
        let batch = coordinator.run_batch(source, &adapter, &mapper).await;

        for table in &batch.tables {
            match sink.write(table) {
                Ok(path) => {
                    tracing::info!("Saved {} rows to {}", table.len(), path.display());
                    report.written.push(path);
                }
                Err(e) => {
                    tracing::error!("Failed to save {}/{}: {}", source, table.market_type, e);
                    report.write_failures += 1;
                }
            }
        }

        if batch.is_complete() {
            tracing::info!("{} batch complete: {}", source, batch.summary());
        } else {
            tracing::warn!("{} batch incomplete: {}", source, batch.summary());
        }
        report.batches.push(batch);
    }

    Ok(report)
}
