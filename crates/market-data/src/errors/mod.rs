//! Error types and failure classification for the snapshot engine.
//!
//! This module provides:
//! - [`SnapshotError`]: The main error enum for all acquisition and normalization operations
//! - [`FailureKind`]: Classification used when a batch records a skipped market type

mod failure;

pub use failure::FailureKind;

use thiserror::Error;

/// Errors that can occur while fetching, decoding, normalizing or writing a snapshot.
///
/// Each variant is classified into a [`FailureKind`] via the
/// [`failure_kind`](Self::failure_kind) method, which the batch coordinator
/// records next to the failed market type.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The (source, market type) pair is not in the catalog.
    #[error("Unknown market type '{market_type}' for source {exchange}")]
    UnknownMarketType {
        /// Exchange identifier ("sse", "szse")
        exchange: String,
        /// The requested market type key
        market_type: String,
    },

    /// Any other caller-side configuration problem.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The HTTP request could not be completed.
    #[error("Transport error: {url} - {message}")]
    Transport {
        /// Requested URL (without query string)
        url: String,
        /// Underlying transport message
        message: String,
    },

    /// The HTTP request exceeded the configured timeout.
    #[error("Timeout: {url}")]
    Timeout {
        /// Requested URL (without query string)
        url: String,
    },

    /// The remote answered with a status other than 200.
    #[error("Unexpected HTTP status {status} from {exchange}")]
    HttpStatus {
        /// Exchange identifier
        exchange: String,
        /// HTTP status code
        status: u16,
    },

    /// The payload did not have the expected shape.
    #[error("Decode error: {exchange} - {message}")]
    Decode {
        /// Exchange identifier
        exchange: String,
        /// Description of the mismatch
        message: String,
    },

    /// The downloaded spreadsheet could not be parsed.
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// The download could not be staged in a temporary file.
    #[error("Failed to stage report in {path}: {message}")]
    Staging {
        /// Download directory
        path: String,
        /// Underlying I/O message
        message: String,
    },

    /// The raw table could not be mapped to the canonical schema.
    #[error("Normalize error: {market_type} - {message}")]
    Normalize {
        /// Market type key
        market_type: String,
        /// Description of the failure
        message: String,
    },

    /// A canonical table could not be persisted.
    #[error("Failed to write {location}: {message}")]
    SinkWrite {
        /// Target location (file path)
        location: String,
        /// Description of the failure
        message: String,
    },
}

impl SnapshotError {
    /// Returns the failure classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use quotesnap_market_data::errors::{FailureKind, SnapshotError};
    ///
    /// let error = SnapshotError::HttpStatus { exchange: "sse".to_string(), status: 503 };
    /// assert_eq!(error.failure_kind(), FailureKind::Fetch);
    ///
    /// let error = SnapshotError::UnknownMarketType {
    ///     exchange: "szse".to_string(),
    ///     market_type: "warrant".to_string(),
    /// };
    /// assert_eq!(error.failure_kind(), FailureKind::Configuration);
    /// ```
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Transport { .. }
            | Self::Timeout { .. }
            | Self::HttpStatus { .. }
            | Self::Decode { .. }
            | Self::Workbook(_)
            | Self::Staging { .. } => FailureKind::Fetch,

            Self::UnknownMarketType { .. } | Self::Configuration(_) => FailureKind::Configuration,

            Self::Normalize { .. } => FailureKind::Normalize,

            Self::SinkWrite { .. } => FailureKind::Resource,
        }
    }

    pub(crate) fn decode(exchange: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            exchange: exchange.into(),
            message: message.into(),
        }
    }
}
