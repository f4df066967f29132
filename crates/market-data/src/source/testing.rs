//! Test doubles shared by the source and batch tests.

use std::io::{Cursor, Write};
use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::{HttpRequest, HttpResponse, HttpTransport};
use crate::errors::SnapshotError;

/// Canned reply for requests whose URL or TABKEY contains a marker.
pub(crate) enum Reply {
    /// JSONP body built around the request's own callback name
    Jsonp(String),
    Bytes(Vec<u8>),
    Status(u16),
    Fail,
    /// The transport gave up waiting
    Timeout,
}

/// Transport answering from a marker → reply table and recording every request.
#[derive(Default)]
pub(crate) struct StubTransport {
    replies: Vec<(String, Reply)>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, marker: &str, reply: Reply) -> Self {
        self.replies.push((marker.to_string(), reply));
        self
    }

    pub fn recorded(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, SnapshotError> {
        self.requests.lock().unwrap().push(request.clone());

        let tab = request.query_value("TABKEY").unwrap_or_default();
        let reply = self
            .replies
            .iter()
            .find(|(marker, _)| request.url.ends_with(marker.as_str()) || tab == marker.as_str())
            .map(|(_, reply)| reply);

        match reply {
            Some(Reply::Jsonp(json)) => {
                let callback = request.query_value("callback").unwrap_or("cb");
                Ok(HttpResponse {
                    status: 200,
                    body: format!("{}({})", callback, json).into_bytes(),
                })
            }
            Some(Reply::Bytes(bytes)) => Ok(HttpResponse {
                status: 200,
                body: bytes.clone(),
            }),
            Some(Reply::Status(status)) => Ok(HttpResponse {
                status: *status,
                body: Vec::new(),
            }),
            Some(Reply::Timeout) => Err(SnapshotError::Timeout {
                url: request.url.clone(),
            }),
            Some(Reply::Fail) | None => Err(SnapshotError::Transport {
                url: request.url.clone(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

/// Build a minimal single-sheet xlsx workbook in memory.
///
/// Cells starting with `#` are written as numbers, empty cells are omitted,
/// everything else is an inline string.
pub(crate) fn xlsx_fixture(rows: &[Vec<&str>]) -> Vec<u8> {
    use zip::write::SimpleFileOptions;

    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, value) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            if value.is_empty() {
                continue;
            }
            match value.strip_prefix('#') {
                Some(number) => {
                    sheet.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, number))
                }
                None => sheet.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference, value
                )),
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}
