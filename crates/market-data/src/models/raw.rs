use serde::Serialize;

use crate::errors::SnapshotError;

/// An untyped cell exactly as a source returned it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl RawValue {
    /// Render the value as text.
    ///
    /// Integral floats print without a fractional part so that a code read
    /// from a numeric spreadsheet cell (`1.0`) renders as `1`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(s) => Some(s.clone()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
                Some(format!("{}", *f as i64))
            }
            Self::Float(f) => Some(f.to_string()),
            Self::Bool(b) => Some(b.to_string()),
        }
    }

    /// Lenient numeric view. Anything that is not a finite number is `None`.
    pub fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Int(i) => *i as f64,
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Empty | Self::Bool(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Empty,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Empty),
            },
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }
}

/// A raw record batch: column names plus positionally aligned rows.
#[derive(Clone, Debug, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    /// Build a table, rejecting rows whose width differs from the column count.
    pub fn new(
        exchange: &str,
        columns: Vec<String>,
        rows: Vec<Vec<RawValue>>,
    ) -> Result<Self, SnapshotError> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(SnapshotError::decode(
                exchange,
                format!(
                    "row {} has {} cells, expected {}",
                    index,
                    row.len(),
                    columns.len()
                ),
            ));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<RawValue>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}
