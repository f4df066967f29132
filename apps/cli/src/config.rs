use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use quotesnap_market_data::{HeaderStyle, MarketSource, SourceSettings, DEFAULT_TIMEZONE};

/// Fetch daily market snapshots from the Shanghai and Shenzhen exchanges
#[derive(Parser, Debug, Default)]
#[command(name = "quotesnap")]
#[command(about = "Fetch SSE/SZSE market snapshots into CSV files")]
#[command(version)]
pub struct Cli {
    /// Exchange to fetch
    #[arg(long, value_enum, default_value_t = SourceSelection::All)]
    pub source: SourceSelection,

    /// Market type key to fetch (repeatable); all catalog types when omitted
    #[arg(long = "market-type", value_name = "KEY")]
    pub market_types: Vec<String>,

    /// Directory the CSV files are written to
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SourceSelection {
    Sse,
    Szse,
    #[default]
    All,
}

impl SourceSelection {
    pub fn sources(&self) -> Vec<MarketSource> {
        match self {
            Self::Sse => vec![MarketSource::Sse],
            Self::Szse => vec![MarketSource::Szse],
            Self::All => MarketSource::ALL.to_vec(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub output_dir: PathBuf,
    download_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub concurrency: usize,
    pub timezone: Tz,
    pub sse_base_url: Option<String>,
    pub szse_base_url: Option<String>,
    pub sse_insecure_tls: bool,
    pub header_style: HeaderStyle,
    pub sources: Vec<MarketSource>,
    pub market_types: Vec<String>,
}

impl Config {
    /// Load `.env`, then read the `QUOTESNAP_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let output_dir = var("QUOTESNAP_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./downloads"));
        let download_dir = var("QUOTESNAP_DOWNLOAD_DIR").map(PathBuf::from);
        let timeout_ms: u64 = var("QUOTESNAP_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".into())
            .parse()
            .unwrap_or(30000);
        let concurrency: usize = var("QUOTESNAP_CONCURRENCY")
            .unwrap_or_else(|| "1".into())
            .parse()
            .unwrap_or(1);
        let timezone = match var("QUOTESNAP_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow!("Invalid QUOTESNAP_TIMEZONE: {}", e))?,
            None => DEFAULT_TIMEZONE,
        };
        let sse_insecure_tls = var("QUOTESNAP_SSE_INSECURE_TLS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let header_style = match var("QUOTESNAP_HEADER_STYLE") {
            Some(name) => HeaderStyle::from_name(&name)
                .with_context(|| format!("Invalid QUOTESNAP_HEADER_STYLE: {}", name))?,
            None => HeaderStyle::default(),
        };

        Ok(Self {
            output_dir,
            download_dir,
            request_timeout: Duration::from_millis(timeout_ms),
            concurrency: concurrency.max(1),
            timezone,
            sse_base_url: var("QUOTESNAP_SSE_BASE_URL"),
            szse_base_url: var("QUOTESNAP_SZSE_BASE_URL"),
            sse_insecure_tls,
            header_style,
            sources: MarketSource::ALL.to_vec(),
            market_types: Vec::new(),
        })
    }

    /// Command-line flags win over the environment.
    pub fn with_cli(mut self, cli: &Cli) -> Self {
        self.sources = cli.source.sources();
        self.market_types = cli.market_types.clone();
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        self
    }

    /// Where SZSE workbooks are staged; the output directory unless set.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.clone())
    }

    pub fn source_settings(&self, source: MarketSource) -> SourceSettings {
        let (settings, base_url) = match source {
            MarketSource::Sse => (
                SourceSettings::sse().with_insecure_tls(self.sse_insecure_tls),
                &self.sse_base_url,
            ),
            MarketSource::Szse => (SourceSettings::szse(), &self.szse_base_url),
        };
        let settings = settings.with_timeout(self.request_timeout);
        match base_url {
            Some(url) => settings.with_base_url(url.trim_end_matches('/')),
            None => settings,
        }
    }
}
