//! Embedded market-type catalog.
//!
//! Loads `markets.json` at compile time via `include_str!` and indexes it
//! once via `lazy_static`. The catalog is read-only configuration: one
//! [`MarketTypeDescriptor`] per (source, category) pair.

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::Deserialize;

use crate::models::{MarketSource, MarketTypeDescriptor};

// ── JSON schema ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CatalogFile {
    sources: Vec<SourceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceEntry {
    source: MarketSource,
    market_types: Vec<MarketTypeDescriptor>,
}

// ── Registry ─────────────────────────────────────────────────────────────────

struct Catalog {
    by_source: HashMap<MarketSource, Vec<MarketTypeDescriptor>>,
}

lazy_static! {
    static ref CATALOG: Catalog = Catalog::load();
}

impl Catalog {
    fn load() -> Self {
        let json = include_str!("markets.json");
        let file: CatalogFile = serde_json::from_str(json).expect("markets.json must be valid");

        let by_source = file
            .sources
            .into_iter()
            .map(|entry| (entry.source, entry.market_types))
            .collect();

        Catalog { by_source }
    }
}

/// All market types configured for a source, in catalog order.
pub fn market_types(source: MarketSource) -> &'static [MarketTypeDescriptor] {
    CATALOG
        .by_source
        .get(&source)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Look up one market type by key.
pub fn find(source: MarketSource, key: &str) -> Option<&'static MarketTypeDescriptor> {
    market_types(source).iter().find(|d| d.key == key)
}
