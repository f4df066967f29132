//! Exchange source adapters.
//!
//! This module contains:
//! - The `HttpTransport` trait every adapter sends its request through
//! - `ReqwestTransport`, the production transport
//! - `JsonpSource` (SSE) and `TabularDownloadSource` (SZSE)
//! - `SourceAdapter`, the enum the batch coordinator dispatches on
//!
//! Adapters receive pre-resolved [`FieldMapping`](crate::mapping::FieldMapping)s;
//! they never rename columns themselves.

mod adapter;
pub mod jsonp;
pub mod tabular;
mod traits;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

pub use adapter::SourceAdapter;
pub use jsonp::JsonpSource;
pub use tabular::TabularDownloadSource;
pub use traits::{HttpRequest, HttpResponse, HttpTransport};
pub use transport::ReqwestTransport;

/// Default HTTP request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Both exchanges reject requests without a browser-like user agent.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Transport settings of one source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceSettings {
    /// Scheme, host and port; endpoint paths are appended
    pub base_url: String,

    /// Whole-request timeout. Exceeding it is a fetch failure.
    pub request_timeout: Duration,

    /// Skip TLS certificate verification.
    ///
    /// Off by default. Only for endpoints whose certificate chain does not verify.
    pub accept_invalid_certs: bool,
}

impl SourceSettings {
    pub fn sse() -> Self {
        Self {
            base_url: jsonp::SSE_BASE_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    pub fn szse() -> Self {
        Self {
            base_url: tabular::SZSE_BASE_URL.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            accept_invalid_certs: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_insecure_tls(mut self, accept_invalid_certs: bool) -> Self {
        self.accept_invalid_certs = accept_invalid_certs;
        self
    }
}
