//! CSV storage for QuoteSnap.
//!
//! Every canonical table becomes one file named
//! `{source}_market_{category}_{YYYYMMDD}.csv`, UTF-8 with a leading BOM so
//! spreadsheet tools pick the right encoding for the localized headers.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use quotesnap_market_data::{table_file_name, CanonicalTable, HeaderStyle, SnapshotError, SnapshotSink};

/// UTF-8 byte order mark (EF BB BF)
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes canonical tables as CSV files into one directory.
#[derive(Clone, Debug)]
pub struct CsvSnapshotSink {
    output_dir: PathBuf,
    header_style: HeaderStyle,
}

impl CsvSnapshotSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            header_style: HeaderStyle::default(),
        }
    }

    pub fn with_header_style(mut self, header_style: HeaderStyle) -> Self {
        self.header_style = header_style;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path of a table, whether or not it was written yet.
    pub fn path_for(&self, table: &CanonicalTable) -> PathBuf {
        self.output_dir.join(table_file_name(table))
    }

    fn encode(&self, table: &CanonicalTable, out: impl Write) -> Result<(), csv::Error> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
        writer.write_record(table.header(self.header_style))?;
        for row in table.rows() {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl SnapshotSink for CsvSnapshotSink {
    /// Write the table, replacing any file of the same name.
    ///
    /// The content goes to a temporary file in the output directory first
    /// and is renamed into place, so a failed write never leaves a truncated
    /// snapshot behind.
    fn write(&self, table: &CanonicalTable) -> Result<PathBuf, SnapshotError> {
        let path = self.path_for(table);
        let sink_error = |message: String| SnapshotError::SinkWrite {
            location: path.display().to_string(),
            message,
        };

        fs::create_dir_all(&self.output_dir).map_err(|e| sink_error(e.to_string()))?;

        let mut file = NamedTempFile::new_in(&self.output_dir).map_err(|e| sink_error(e.to_string()))?;
        file.write_all(UTF8_BOM).map_err(|e| sink_error(e.to_string()))?;
        self.encode(table, file.as_file_mut())
            .map_err(|e| sink_error(e.to_string()))?;
        file.persist(&path).map_err(|e| sink_error(e.error.to_string()))?;

        debug!("Wrote {} rows to {}", table.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use quotesnap_market_data::{CanonicalField, CanonicalRecord, MarketSource};

    use super::*;

    fn sse_table() -> CanonicalTable {
        let date = NaiveDate::from_ymd_opt(2024, 12, 17).unwrap();
        let mut record = CanonicalRecord::new(MarketSource::Sse, "equity", date);
        record.security_code = "600000".to_string();
        record.security_name = Some("浦发银行".to_string());
        record.open = Some(10.0);
        record.change_rate = Some(2.5);

        CanonicalTable {
            source: MarketSource::Sse,
            market_type: "equity".to_string(),
            trade_date: date,
            columns: vec![
                CanonicalField::SecurityCode,
                CanonicalField::SecurityName,
                CanonicalField::Open,
                CanonicalField::Last,
                CanonicalField::ChangeRate,
            ],
            extra_columns: Vec::new(),
            records: vec![record],
        }
    }

    #[test]
    fn test_write_with_bom_and_localized_header() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSnapshotSink::new(dir.path());

        let path = sink.write(&sse_table()).unwrap();
        assert_eq!(path, dir.path().join("sse_market_equity_20241217.csv"));

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "交易所,市场类型,交易日期,证券代码,证券名称,开盘价,最新价,涨跌幅"
        );
        // Missing values are empty cells, codes keep their zeros.
        assert_eq!(lines[1], "sse,equity,2024-12-17,600000,浦发银行,10,,2.5");
    }

    #[test]
    fn test_canonical_header_and_passthrough_columns() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSnapshotSink::new(dir.path()).with_header_style(HeaderStyle::Canonical);

        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let mut record = CanonicalRecord::new(MarketSource::Szse, "stock", date);
        record.security_code = "000001".to_string();
        record.security_name = Some("平安银行".to_string());
        record.extra = vec![Some("1,234".to_string()), None];
        let table = CanonicalTable {
            source: MarketSource::Szse,
            market_type: "stock".to_string(),
            trade_date: date,
            columns: vec![CanonicalField::SecurityCode, CanonicalField::SecurityName],
            extra_columns: vec!["成交金额".to_string(), "备注".to_string()],
            records: vec![record],
        };

        let path = sink.write(&table).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let text = text.trim_start_matches('\u{feff}');
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "marketSource,marketType,tradeDate,securityCode,securityName,成交金额,备注"
        );
        assert_eq!(lines[1], "szse,stock,2025-01-02,000001,平安银行,\"1,234\",");
    }

    #[test]
    fn test_creates_output_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("daily");
        let sink = CsvSnapshotSink::new(&nested);

        let first = sink.write(&sse_table()).unwrap();
        let mut empty = sse_table();
        empty.records.clear();
        let second = sink.write(&empty).unwrap();

        assert_eq!(first, second);
        let text = fs::read_to_string(&second).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert_eq!(fs::read_dir(&nested).unwrap().count(), 1);
    }

    #[test]
    fn test_unwritable_dir_is_sink_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();
        let sink = CsvSnapshotSink::new(blocker.join("nested"));

        let err = sink.write(&sse_table()).unwrap_err();
        assert!(matches!(err, SnapshotError::SinkWrite { .. }));
        assert_eq!(err.failure_kind(), quotesnap_market_data::FailureKind::Resource);
    }
}
