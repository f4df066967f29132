//! Field mapping between raw source schemas and the canonical schema.
//!
//! A [`FieldMapping`] tells the adapter which raw fields to request and the
//! normalizer how to rename them. Mappings are derived from the catalog; a
//! pair the catalog does not know fails fast with a configuration error.

use crate::catalog;
use crate::errors::SnapshotError;
use crate::models::{CanonicalField, MarketSource, MarketTypeDescriptor};

/// SSE quote fields after code and name, in request order.
const SSE_QUOTE_FIELDS: &[(&str, CanonicalField)] = &[
    ("open", CanonicalField::Open),
    ("high", CanonicalField::High),
    ("low", CanonicalField::Low),
    ("last", CanonicalField::Last),
    ("prev_close", CanonicalField::PrevClose),
    ("chg_rate", CanonicalField::ChangeRate),
    ("volume", CanonicalField::Volume),
    ("amount", CanonicalField::Amount),
    ("tradephase", CanonicalField::TradePhase),
    ("change", CanonicalField::ChangeAmount),
    ("amp_rate", CanonicalField::AmplitudeRate),
    ("cpxxsubtype", CanonicalField::SecuritySubtype),
];

/// Resolved schema for one (source, market type) pair.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldMapping {
    pub source: MarketSource,
    pub market_type: &'static MarketTypeDescriptor,

    /// Raw fields to request (JSONP) or that must be present (spreadsheet), in order
    pub ordered_raw_fields: Vec<String>,

    /// Raw field → canonical field, in output order
    pub renames: Vec<(String, CanonicalField)>,

    /// Zero-pad width for security codes
    pub code_width: Option<usize>,

    /// Whether raw columns without a rename are carried through unchanged
    pub passthrough_unmapped: bool,
}

impl FieldMapping {
    pub fn canonical_for(&self, raw_field: &str) -> Option<CanonicalField> {
        self.renames
            .iter()
            .find(|(raw, _)| raw == raw_field)
            .map(|(_, field)| *field)
    }

    /// Canonical data columns this mapping populates, in output order.
    pub fn columns(&self) -> Vec<CanonicalField> {
        self.renames.iter().map(|(_, field)| *field).collect()
    }

    pub fn market_key(&self) -> &str {
        &self.market_type.key
    }
}

/// Resolves [`FieldMapping`]s from the catalog. Pure, no I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldMapper;

impl FieldMapper {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the mapping for a (source, market type) pair.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::UnknownMarketType`] when the catalog has no such pair.
    pub fn resolve(
        &self,
        source: MarketSource,
        market_type: &str,
    ) -> Result<FieldMapping, SnapshotError> {
        let descriptor =
            catalog::find(source, market_type).ok_or_else(|| SnapshotError::UnknownMarketType {
                exchange: source.id().to_string(),
                market_type: market_type.to_string(),
            })?;

        Ok(match source {
            MarketSource::Sse => Self::selected_fields(source, descriptor),
            MarketSource::Szse => Self::report_headers(source, descriptor),
        })
    }

    /// Field-selection schema: every requested field has a canonical name.
    fn selected_fields(
        source: MarketSource,
        descriptor: &'static MarketTypeDescriptor,
    ) -> FieldMapping {
        let mut renames = vec![
            (descriptor.code_field.clone(), CanonicalField::SecurityCode),
            (descriptor.name_field.clone(), CanonicalField::SecurityName),
        ];
        renames.extend(
            SSE_QUOTE_FIELDS
                .iter()
                .map(|(raw, field)| (raw.to_string(), *field)),
        );

        FieldMapping {
            source,
            market_type: descriptor,
            ordered_raw_fields: renames.iter().map(|(raw, _)| raw.clone()).collect(),
            renames,
            code_width: source.code_width(),
            passthrough_unmapped: false,
        }
    }

    /// Report schema: headers pass through, only code and name are unified.
    fn report_headers(
        source: MarketSource,
        descriptor: &'static MarketTypeDescriptor,
    ) -> FieldMapping {
        let renames = vec![
            (descriptor.code_field.clone(), CanonicalField::SecurityCode),
            (descriptor.name_field.clone(), CanonicalField::SecurityName),
        ];

        FieldMapping {
            source,
            market_type: descriptor,
            ordered_raw_fields: renames.iter().map(|(raw, _)| raw.clone()).collect(),
            renames,
            code_width: source.code_width(),
            passthrough_unmapped: true,
        }
    }
}
