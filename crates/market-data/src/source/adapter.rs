use crate::errors::SnapshotError;
use crate::mapping::FieldMapping;
use crate::models::{MarketSource, MarketTypeDescriptor, RawTable, RunContext};

use super::jsonp::JsonpSource;
use super::tabular::TabularDownloadSource;

/// One exchange's acquisition path.
///
/// Dispatch is a plain match over the two wire formats.
pub enum SourceAdapter {
    Jsonp(JsonpSource),
    TabularDownload(TabularDownloadSource),
}

impl SourceAdapter {
    /// The exchange this adapter talks to.
    pub fn source(&self) -> MarketSource {
        match self {
            Self::Jsonp(_) => MarketSource::Sse,
            Self::TabularDownload(_) => MarketSource::Szse,
        }
    }

    /// Fetch the raw table of one market type.
    ///
    /// Exactly one remote call; no retry.
    pub async fn fetch_raw(
        &self,
        descriptor: &MarketTypeDescriptor,
        mapping: &FieldMapping,
        context: &RunContext,
    ) -> Result<RawTable, SnapshotError> {
        match self {
            Self::Jsonp(source) => source.fetch_raw(descriptor, mapping).await,
            Self::TabularDownload(source) => source.fetch_raw(descriptor, context).await,
        }
    }
}

impl From<JsonpSource> for SourceAdapter {
    fn from(source: JsonpSource) -> Self {
        Self::Jsonp(source)
    }
}

impl From<TabularDownloadSource> for SourceAdapter {
    fn from(source: TabularDownloadSource) -> Self {
        Self::TabularDownload(source)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::errors::FailureKind;
    use crate::mapping::FieldMapper;
    use crate::models::RawValue;
    use crate::source::testing::{xlsx_fixture, Reply, StubTransport};
    use crate::source::SourceSettings;

    fn context() -> RunContext {
        RunContext::new(NaiveDate::from_ymd_opt(2024, 12, 17).unwrap())
    }

    #[tokio::test]
    async fn test_jsonp_request_shape() {
        let stub = Arc::new(StubTransport::new().reply(
            "/v1/sh1/list/exchange/fwr",
            Reply::Jsonp(r#"{"list":[]}"#.to_string()),
        ));
        let adapter = SourceAdapter::from(JsonpSource::with_transport(
            SourceSettings::sse(),
            stub.clone(),
        ));
        let mapping = FieldMapper::new().resolve(MarketSource::Sse, "fund").unwrap();

        let table = adapter
            .fetch_raw(mapping.market_type, &mapping, &context())
            .await
            .unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), mapping.ordered_raw_fields.as_slice());

        let requests = stub.recorded();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(
            request.url,
            "https://yunhq.sse.com.cn:32042/v1/sh1/list/exchange/fwr"
        );
        assert!(request
            .query_value("callback")
            .unwrap()
            .starts_with("jsonpCallback"));
        assert!(request
            .query_value("select")
            .unwrap()
            .starts_with("code,cpxxextendname,open"));
        assert_eq!(request.query_value("begin"), Some("0"));
        assert_eq!(request.query_value("end"), Some("5000"));
        assert!(request.query_value("_").is_some());
        assert!(request
            .headers
            .iter()
            .any(|(name, value)| *name == "Referer" && value == "https://www.sse.com.cn/"));
    }

    #[tokio::test]
    async fn test_jsonp_non_200_is_fetch_failure() {
        let stub = Arc::new(StubTransport::new().reply(
            "/v1/sh1/list/exchange/equity",
            Reply::Status(502),
        ));
        let adapter = SourceAdapter::from(JsonpSource::with_transport(SourceSettings::sse(), stub));
        let mapping = FieldMapper::new().resolve(MarketSource::Sse, "equity").unwrap();

        let err = adapter
            .fetch_raw(mapping.market_type, &mapping, &context())
            .await
            .unwrap_err();
        assert!(matches!(err, SnapshotError::HttpStatus { status: 502, .. }));
        assert_eq!(err.failure_kind(), FailureKind::Fetch);
    }

    #[tokio::test]
    async fn test_tabular_request_and_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = xlsx_fixture(&[vec!["证券代码", "证券简称"], vec!["000001", "平安银行"]]);
        let stub = Arc::new(StubTransport::new().reply("tab1", Reply::Bytes(bytes)));
        let adapter = SourceAdapter::from(TabularDownloadSource::with_transport(
            SourceSettings::szse(),
            dir.path(),
            stub.clone(),
        ));
        let mapping = FieldMapper::new().resolve(MarketSource::Szse, "stock").unwrap();

        let table = adapter
            .fetch_raw(mapping.market_type, &mapping, &context())
            .await
            .unwrap();
        assert_eq!(table.rows()[0][1], RawValue::Text("平安银行".to_string()));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());

        let request = &stub.recorded()[0];
        assert_eq!(request.url, "https://www.szse.cn/api/report/ShowReport");
        assert_eq!(request.query_value("SHOWTYPE"), Some("xlsx"));
        assert_eq!(request.query_value("CATALOGID"), Some("1815_stock_snapshot"));
        assert_eq!(request.query_value("TABKEY"), Some("tab1"));
        assert_eq!(request.query_value("txtBeginDate"), Some("2024-12-17"));
        assert_eq!(request.query_value("txtEndDate"), Some("2024-12-17"));
        assert_eq!(request.query_value("archiveDate"), Some("2022-12-01"));
        assert!(request.query_value("random").is_some());
    }

    #[tokio::test]
    async fn test_tabular_parse_failure_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let stub = Arc::new(
            StubTransport::new().reply("tab2", Reply::Bytes(b"not a workbook".to_vec())),
        );
        let adapter = SourceAdapter::from(TabularDownloadSource::with_transport(
            SourceSettings::szse(),
            dir.path(),
            stub,
        ));
        let mapping = FieldMapper::new().resolve(MarketSource::Szse, "fund").unwrap();

        let err = adapter
            .fetch_raw(mapping.market_type, &mapping, &context())
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), FailureKind::Fetch);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_adapter_source() {
        let stub = Arc::new(StubTransport::new());
        let sse = SourceAdapter::from(JsonpSource::with_transport(SourceSettings::sse(), stub.clone()));
        let szse = SourceAdapter::from(TabularDownloadSource::with_transport(
            SourceSettings::szse(),
            "downloads",
            stub,
        ));
        assert_eq!(sse.source(), MarketSource::Sse);
        assert_eq!(szse.source(), MarketSource::Szse);
    }
}
