//! SZSE snapshot report (xlsx download).
//!
//! The report endpoint generates a workbook per request. The body is written
//! to a uniquely named temporary file in the download directory, parsed, and
//! the file is removed again whatever the outcome.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use calamine::{open_workbook, Data, Reader, Xlsx};
use log::{debug, warn};
use tempfile::NamedTempFile;

use super::traits::{HttpRequest, HttpTransport};
use super::{ReqwestTransport, SourceSettings, BROWSER_USER_AGENT};
use crate::errors::SnapshotError;
use crate::models::{MarketSource, MarketTypeDescriptor, RawTable, RawValue, RunContext};

pub const SZSE_BASE_URL: &str = "https://www.szse.cn";

const REPORT_PATH: &str = "/api/report/ShowReport";
const CATALOG_ID: &str = "1815_stock_snapshot";
const REFERER: &str = "https://www.szse.cn/market/trend/index.html";

/// Cutoff separating the live report from the historical archive.
const ARCHIVE_CUTOFF: &str = "2022-12-01";

/// Generated-spreadsheet download source.
pub struct TabularDownloadSource {
    settings: SourceSettings,
    download_dir: PathBuf,
    transport: Arc<dyn HttpTransport>,
}

impl TabularDownloadSource {
    const SOURCE: MarketSource = MarketSource::Szse;

    pub fn new(
        settings: SourceSettings,
        download_dir: impl Into<PathBuf>,
    ) -> Result<Self, SnapshotError> {
        let transport = Arc::new(ReqwestTransport::new(&settings)?);
        Ok(Self::with_transport(settings, download_dir, transport))
    }

    pub fn with_transport(
        settings: SourceSettings,
        download_dir: impl Into<PathBuf>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            settings,
            download_dir: download_dir.into(),
            transport,
        }
    }

    /// Download and parse the report tab of one market type.
    pub async fn fetch_raw(
        &self,
        descriptor: &MarketTypeDescriptor,
        context: &RunContext,
    ) -> Result<RawTable, SnapshotError> {
        let date = context.trade_date.format("%Y-%m-%d").to_string();
        let request = HttpRequest::get(format!(
            "{}{}",
            self.settings.base_url.trim_end_matches('/'),
            REPORT_PATH
        ))
        .query("SHOWTYPE", "xlsx")
        .query("CATALOGID", CATALOG_ID)
        .query("TABKEY", descriptor.source_parameter.as_str())
        .query("txtBeginDate", date.as_str())
        .query("txtEndDate", date)
        .query("archiveDate", ARCHIVE_CUTOFF)
        .query("random", rand::random::<f64>().to_string())
        .header("User-Agent", BROWSER_USER_AGENT)
        .header("Referer", REFERER);

        let response = self.transport.get(request).await?.ensure_ok(Self::SOURCE)?;
        debug!(
            "Downloaded {} bytes for {}/{}",
            response.body.len(),
            Self::SOURCE,
            descriptor.key
        );

        let dir = self.download_dir.clone();
        tokio::task::spawn_blocking(move || read_report(&dir, &response.body))
            .await
            .map_err(|e| SnapshotError::Workbook(format!("report parser task failed: {}", e)))?
    }
}

/// Write `bytes` to a scoped temporary file in `dir` and parse it as a workbook.
///
/// The temporary file is removed on every path; a failed removal is logged
/// and does not change the result.
pub fn read_report(dir: &Path, bytes: &[u8]) -> Result<RawTable, SnapshotError> {
    let staging = |e: std::io::Error| SnapshotError::Staging {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    std::fs::create_dir_all(dir).map_err(staging)?;
    let mut file = tempfile::Builder::new()
        .prefix("szse_report_")
        .suffix(".xlsx")
        .tempfile_in(dir)
        .map_err(staging)?;
    if let Err(e) = file.write_all(bytes).and_then(|_| file.flush()) {
        release(file);
        return Err(staging(e));
    }

    let parsed = parse_workbook(file.path());
    release(file);
    parsed
}

fn release(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        warn!(
            "Failed to remove temporary report {}: {}",
            path.display(),
            e
        );
    }
}

/// Parse the first worksheet: first non-empty row is the header row.
fn parse_workbook(path: &Path) -> Result<RawTable, SnapshotError> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| SnapshotError::Workbook(format!("cannot open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SnapshotError::Workbook("workbook has no worksheet".to_string()))?
        .map_err(|e| SnapshotError::Workbook(format!("cannot read worksheet: {}", e)))?;

    let mut rows = range
        .rows()
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)));

    let header = rows.next().ok_or_else(|| {
        SnapshotError::decode(MarketSource::Szse.id(), "report has no header row")
    })?;
    let columns = header
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell_value(cell).to_text() {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => format!("Unnamed: {}", index),
        })
        .collect();

    let data = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    RawTable::new(MarketSource::Szse.id(), columns, data)
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty => RawValue::Empty,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Int(i) => RawValue::Int(*i),
        Data::Float(f) => RawValue::Float(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        other => RawValue::Text(other.to_string()),
    }
}
