//! HTTP transport abstraction used by the source adapters.

use async_trait::async_trait;

use crate::errors::SnapshotError;
use crate::models::MarketSource;

/// A single GET request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(&'static str, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Both sources answer 200 on success; anything else is a fetch failure.
    pub fn ensure_ok(self, source: MarketSource) -> Result<Self, SnapshotError> {
        if self.status != 200 {
            return Err(SnapshotError::HttpStatus {
                exchange: source.id().to_string(),
                status: self.status,
            });
        }
        Ok(self)
    }
}

/// Trait for the HTTP layer under the adapters.
///
/// Production code uses [`ReqwestTransport`](super::ReqwestTransport);
/// tests substitute canned responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue one GET request. No retry.
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, SnapshotError>;
}
