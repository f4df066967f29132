//! Snapshot data models
//!
//! This module contains the core data types of the engine:
//! - `market` - Exchange identity (MarketSource) and category configuration (MarketTypeDescriptor)
//! - `raw` - Untyped source payloads (RawValue, RawTable)
//! - `record` - The canonical schema (CanonicalField, CanonicalRecord, CanonicalTable)
//! - `context` - Per-run context (RunContext)

mod context;
mod market;
mod raw;
mod record;

pub use context::{RunContext, DEFAULT_TIMEZONE};
pub use market::{MarketSource, MarketTypeDescriptor};
pub use raw::{RawTable, RawValue};
pub use record::{CanonicalField, CanonicalRecord, CanonicalTable, HeaderStyle};
