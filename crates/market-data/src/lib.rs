//! QuoteSnap Market Data Crate
//!
//! This crate fetches end-of-day market snapshots from the Shanghai (SSE)
//! and Shenzhen (SZSE) stock exchanges and turns them into one canonical
//! tabular schema.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Two wire formats: JSONP (SSE) and xlsx report downloads (SZSE)
//! - A static catalog of market types per exchange
//! - Explicit raw-field → canonical-field mappings
//! - Per-market-type failure isolation inside a batch
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |     Catalog      | --> |   FieldMapper    |  (raw → canonical mapping)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  SourceAdapter   |  (JSONP / xlsx download)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Normalizer    |  (codes, numbers, date)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |  CanonicalTable  | --> SnapshotSink
//!                          +------------------+
//! ```
//!
//! [`MarketBatchCoordinator`] drives the pipeline for every market type of a
//! source and collects the results into a [`Batch`].
//!
//! # Core Types
//!
//! - [`MarketSource`] - Exchange identity
//! - [`MarketTypeDescriptor`] - Catalog entry of one market category
//! - [`RawTable`] - Source payload before normalization
//! - [`CanonicalTable`] - Normalized output of one market type
//! - [`SnapshotError`] - Error type, classified by [`FailureKind`]

pub mod batch;
pub mod catalog;
pub mod errors;
pub mod mapping;
pub mod models;
pub mod normalize;
pub mod sink;
pub mod source;

pub use batch::{Batch, MarketBatchCoordinator, MarketFailure};
pub use errors::{FailureKind, SnapshotError};
pub use mapping::{FieldMapper, FieldMapping};
pub use models::{
    CanonicalField, CanonicalRecord, CanonicalTable, HeaderStyle, MarketSource,
    MarketTypeDescriptor, RawTable, RawValue, RunContext, DEFAULT_TIMEZONE,
};
pub use normalize::Normalizer;
pub use sink::{snapshot_file_name, table_file_name, SnapshotSink};
pub use source::{
    HttpRequest, HttpResponse, HttpTransport, JsonpSource, ReqwestTransport, SourceAdapter,
    SourceSettings, TabularDownloadSource,
};
