//! SSE quote endpoint (JSONP).
//!
//! The endpoint answers `callback({"list": [[...], ...], ...})` where each
//! row is positionally aligned with the `select` list of the request.

use std::sync::Arc;

use chrono::Utc;
use lazy_static::lazy_static;
use log::debug;
use rand::Rng;
use regex::Regex;
use serde::Deserialize;

use super::traits::{HttpRequest, HttpTransport};
use super::{ReqwestTransport, SourceSettings, BROWSER_USER_AGENT};
use crate::errors::SnapshotError;
use crate::mapping::FieldMapping;
use crate::models::{MarketSource, MarketTypeDescriptor, RawTable, RawValue};

pub const SSE_BASE_URL: &str = "https://yunhq.sse.com.cn:32042";

const REFERER: &str = "https://www.sse.com.cn/";
const ORIGIN: &str = "https://www.sse.com.cn";

/// Row window wide enough to capture a full listing in one call.
const ROW_WINDOW_END: u32 = 5000;

lazy_static! {
    /// `identifier(interior)` with optional whitespace and trailing `;`.
    static ref JSONP_ENVELOPE: Regex =
        Regex::new(r"(?s)\A\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*\((.*)\)\s*;?\s*\z")
            .expect("JSONP envelope pattern must compile");
}

#[derive(Debug, Deserialize)]
struct ListPayload {
    list: Vec<Vec<serde_json::Value>>,
}

/// JSONP-wrapped REST source.
pub struct JsonpSource {
    settings: SourceSettings,
    transport: Arc<dyn HttpTransport>,
}

impl JsonpSource {
    const SOURCE: MarketSource = MarketSource::Sse;

    pub fn new(settings: SourceSettings) -> Result<Self, SnapshotError> {
        let transport = Arc::new(ReqwestTransport::new(&settings)?);
        Ok(Self::with_transport(settings, transport))
    }

    pub fn with_transport(settings: SourceSettings, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Fetch the full listing of one market type.
    pub async fn fetch_raw(
        &self,
        descriptor: &MarketTypeDescriptor,
        mapping: &FieldMapping,
    ) -> Result<RawTable, SnapshotError> {
        let callback = callback_name();
        let fields = &mapping.ordered_raw_fields;

        let request = HttpRequest::get(format!(
            "{}{}",
            self.settings.base_url.trim_end_matches('/'),
            descriptor.source_parameter
        ))
        .query("callback", callback.as_str())
        .query("select", fields.join(","))
        .query("order", "")
        .query("begin", "0")
        .query("end", ROW_WINDOW_END.to_string())
        .query("_", Utc::now().timestamp_millis().to_string())
        .header("User-Agent", BROWSER_USER_AGENT)
        .header("Accept", "*/*")
        .header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
        .header("Referer", REFERER)
        .header("Origin", ORIGIN);

        let response = self.transport.get(request).await?.ensure_ok(Self::SOURCE)?;
        let body = String::from_utf8(response.body).map_err(|e| {
            SnapshotError::decode(Self::SOURCE.id(), format!("body is not UTF-8: {}", e))
        })?;

        let table = decode_payload(&body, Some(&callback), fields)?;
        debug!(
            "Decoded {} rows for {}/{}",
            table.len(),
            Self::SOURCE,
            descriptor.key
        );
        Ok(table)
    }
}

/// `jsonpCallback` followed by eight random digits.
fn callback_name() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(10_000_000..=99_999_999);
    format!("jsonpCallback{}", suffix)
}

/// Strip a JSONP envelope and return the JSON interior.
///
/// The body must be exactly `name(<json>)`, optionally followed by `;`.
/// When `expected_callback` is set the function name must match it.
/// The interior is not validated here; callers parse it as JSON.
pub fn unwrap_jsonp<'a>(
    body: &'a str,
    expected_callback: Option<&str>,
) -> Result<&'a str, SnapshotError> {
    let source = MarketSource::Sse.id();
    let captures = JSONP_ENVELOPE
        .captures(body)
        .ok_or_else(|| SnapshotError::decode(source, "response is not a JSONP envelope"))?;

    let name = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    if let Some(expected) = expected_callback {
        if name != expected {
            return Err(SnapshotError::decode(
                source,
                format!("callback '{}' does not match '{}'", name, expected),
            ));
        }
    }

    Ok(captures.get(2).map(|m| m.as_str()).unwrap_or_default())
}

/// Decode a JSONP body into a raw table with `fields` as its columns.
pub fn decode_payload(
    body: &str,
    expected_callback: Option<&str>,
    fields: &[String],
) -> Result<RawTable, SnapshotError> {
    let source = MarketSource::Sse.id();
    let interior = unwrap_jsonp(body, expected_callback)?;

    let payload: ListPayload = serde_json::from_str(interior)
        .map_err(|e| SnapshotError::decode(source, format!("unexpected payload: {}", e)))?;

    let rows = payload
        .list
        .into_iter()
        .map(|row| row.into_iter().map(RawValue::from).collect())
        .collect();

    RawTable::new(source, fields.to_vec(), rows)
}
