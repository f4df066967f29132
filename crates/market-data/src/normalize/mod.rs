//! Raw table → canonical table conversion.
//!
//! The normalizer is a pure function of its inputs. Cell-level coercion
//! failures never fail the record; only a schema mismatch (a required raw
//! column missing) fails the table.

use log::debug;

use crate::errors::SnapshotError;
use crate::mapping::FieldMapping;
use crate::models::{
    CanonicalField, CanonicalRecord, CanonicalTable, RawTable, RawValue, RunContext,
};

/// Where a raw column ends up in the canonical record.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Field(CanonicalField),
    Extra(usize),
    Ignored,
}

/// Converts raw tables into canonical tables.
#[derive(Clone, Copy, Debug, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize one raw table through `mapping`.
    ///
    /// Emits one record per input row, in input order.
    pub fn normalize(
        &self,
        raw: &RawTable,
        mapping: &FieldMapping,
        context: &RunContext,
    ) -> Result<CanonicalTable, SnapshotError> {
        let market_key = mapping.market_key();

        let missing: Vec<&str> = mapping
            .ordered_raw_fields
            .iter()
            .filter(|field| raw.column_index(field).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(SnapshotError::Normalize {
                market_type: market_key.to_string(),
                message: format!("missing columns: {}", missing.join(", ")),
            });
        }

        let reserved: Vec<CanonicalField> = CanonicalField::CONTEXT
            .into_iter()
            .chain(mapping.columns())
            .collect();

        let mut extra_columns: Vec<String> = Vec::new();
        let slots: Vec<Slot> = raw
            .columns()
            .iter()
            .map(|column| match mapping.canonical_for(column) {
                Some(field) => Slot::Field(field),
                None if !mapping.passthrough_unmapped => Slot::Ignored,
                // Already emitted as a canonical column (e.g. the report's own trade date).
                None if shadows_canonical(column, &reserved) => {
                    debug!("Dropping raw column '{}' of {}", column, market_key);
                    Slot::Ignored
                }
                None => {
                    let header = unique_header(column, &extra_columns);
                    extra_columns.push(header);
                    Slot::Extra(extra_columns.len() - 1)
                }
            })
            .collect();

        let records = raw
            .rows()
            .iter()
            .map(|row| {
                let mut record =
                    CanonicalRecord::new(mapping.source, market_key, context.trade_date);
                record.extra = vec![None; extra_columns.len()];

                for (cell, slot) in row.iter().zip(&slots) {
                    match *slot {
                        Slot::Field(CanonicalField::SecurityCode) => {
                            record.security_code = security_code(cell, mapping.code_width);
                        }
                        Slot::Field(field) if field.is_numeric() => {
                            record.set_numeric(field, cell.to_f64());
                        }
                        Slot::Field(field) => record.set_text(field, cell.to_text()),
                        Slot::Extra(index) => record.extra[index] = cell.to_text(),
                        Slot::Ignored => {}
                    }
                }
                record
            })
            .collect::<Vec<_>>();

        debug!(
            "Normalized {} rows for {}/{} ({} pass-through columns)",
            records.len(),
            mapping.source,
            market_key,
            extra_columns.len()
        );

        Ok(CanonicalTable {
            source: mapping.source,
            market_type: market_key.to_string(),
            trade_date: context.trade_date,
            columns: mapping.columns(),
            extra_columns,
            records,
        })
    }
}

fn shadows_canonical(header: &str, reserved: &[CanonicalField]) -> bool {
    let header = header.trim();
    reserved
        .iter()
        .any(|field| field.label() == header || field.key() == header)
}

/// `header`, or `header.N` with the smallest N not taken yet.
fn unique_header(header: &str, taken: &[String]) -> String {
    if !taken.iter().any(|t| t == header) {
        return header.to_string();
    }
    (1..)
        .map(|n| format!("{}.{}", header, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| header.to_string())
}

/// Coerce a raw code cell to text and left-pad it with `'0'` to `width`.
///
/// Empty cells stay empty; codes already at or beyond `width` are unchanged.
pub fn security_code(cell: &RawValue, width: Option<usize>) -> String {
    let code = cell
        .to_text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    match width {
        Some(width) if !code.is_empty() && code.chars().count() < width => {
            format!("{:0>width$}", code, width = width)
        }
        _ => code,
    }
}
