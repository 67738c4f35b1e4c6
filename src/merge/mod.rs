//! Joins the keyed datasets of one cycle into a single typed frame.
//!
//! Every output row is one primary record. Field names are renamed through
//! the display-label maps, sanitized into column-safe identifiers, and each
//! column gets one inferred type:
//!
//! - any unconverted string, or values of more than one kind, turn the
//!   whole column into strings;
//! - numbers become `Int64` when all integral, else `Float64`;
//! - dates become `Date` when all at midnight UTC, else `Datetime(ms)`;
//! - booleans become `Boolean`.
//!
//! Columns without a single value are dropped and a constant
//! `ExtractionTime` column is appended last.

mod cell;
mod column;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde_json::{Map, Value};
use thiserror::Error;

pub use cell::{Cell, normalize_str, sanitize_key};
use column::{ColumnAccumulator, datetime_series};

/// One record as returned by the source.
pub type RawRecord = Map<String, Value>;

/// Identifier correlating records across datasets.
pub type MergeKey = i64;

/// Raw field code to display label.
pub type ColumnNameMap = HashMap<String, String>;

/// Secondary attribute id to display label.
pub type AttributeNameMap = HashMap<MergeKey, String>;

/// Status code to display label.
pub type StatusLabels = HashMap<String, String>;

/// Name of the trailing timestamp column.
pub const EXTRACTION_TIME_COLUMN: &str = "ExtractionTime";

/// Field names of the status enrichment, before renaming.
pub const STATUS_FIELD: &str = "uppStatus";
pub const STATUS_CHANGED_FIELD: &str = "uppStatusChgDate";

/// Per-key status enrichment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatusRecord {
    pub status: Value,
    pub status_changed: Value,
}

/// Everything the merge needs for one cycle.
#[derive(Clone, Debug, Default)]
pub struct MergeInput {
    pub rows: Vec<RawRecord>,
    /// Field of each row holding its correlation key.
    pub key_field: String,
    pub status_by_key: HashMap<MergeKey, StatusRecord>,
    /// Row key to the key of its secondary attributes.
    pub correlation: HashMap<MergeKey, MergeKey>,
    /// Secondary key to its `(attribute id, value)` pairs, in source order.
    pub attributes_by_key: HashMap<MergeKey, Vec<(MergeKey, Value)>>,
    pub column_names: ColumnNameMap,
    pub attribute_names: AttributeNameMap,
    pub status_labels: StatusLabels,
    pub extraction_time: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("frame assembly failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Read a correlation key out of a JSON value.
pub fn merge_key(value: &Value) -> Option<MergeKey> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl MergeInput {
    /// Display name of a raw field code.
    fn column_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.column_names.get(key).map_or(key, String::as_str)
    }

    /// Label of a status code, or the code itself when it has none.
    fn status_label(&self, key: &str, code: &Value) -> Value {
        self.status_labels
            .get(key)
            .map_or_else(|| code.clone(), |label| Value::String(label.clone()))
    }

    /// Ordered `(name, value)` pairs of one output row, before sanitizing.
    fn row_pairs<'a>(&'a self, record: &'a RawRecord) -> Vec<(&'a str, Value)> {
        let key = record.get(&self.key_field).and_then(merge_key);
        let status = key.and_then(|k| self.status_by_key.get(&k));

        let status_value = match status.map(|s| &s.status) {
            Some(code @ Value::String(text)) => self.status_label(text, code),
            Some(code @ Value::Number(n)) => self.status_label(&n.to_string(), code),
            Some(other) => other.clone(),
            None => Value::Null,
        };
        let changed_value = status.map_or(Value::Null, |s| s.status_changed.clone());

        let mut pairs = Vec::with_capacity(record.len() + 2);
        pairs.push((self.column_name(STATUS_FIELD), status_value));
        pairs.push((self.column_name(STATUS_CHANGED_FIELD), changed_value));
        pairs.extend(record.iter().map(|(k, v)| (self.column_name(k), v.clone())));

        let attributes = key
            .and_then(|k| self.correlation.get(&k))
            .and_then(|secondary| self.attributes_by_key.get(secondary));
        if let Some(attributes) = attributes {
            pairs.extend(attributes.iter().filter_map(|(id, value)| {
                self.attribute_names
                    .get(id)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name.as_str(), value.clone()))
            }));
        }

        pairs
    }
}

/// Assemble the typed frame for `input`.
///
/// Output rows follow `input.rows` one to one. Fails without side effects when
/// polars rejects the frame.
pub fn merge_and_infer(input: &MergeInput) -> Result<DataFrame, MergeError> {
    let height = input.rows.len();
    let mut accumulators: Vec<ColumnAccumulator> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (row, record) in input.rows.iter().enumerate() {
        for (name, value) in input.row_pairs(record) {
            let column = sanitize_key(name);
            let slot = match index.get(&column) {
                Some(&slot) => slot,
                None => {
                    accumulators.push(ColumnAccumulator::new(column.clone(), height));
                    index.insert(column, accumulators.len() - 1);
                    accumulators.len() - 1
                }
            };
            accumulators[slot].set(row, Cell::from_json(&value));
        }
    }

    let mut columns = Vec::with_capacity(accumulators.len() + 1);
    for acc in accumulators {
        // the timestamp column always wins over a source field of that name
        if acc.is_null() || acc.name() == EXTRACTION_TIME_COLUMN {
            continue;
        }
        columns.push(acc.into_series()?.into_column());
    }

    let stamp = input.extraction_time.timestamp_millis();
    let extraction_time = datetime_series(
        EXTRACTION_TIME_COLUMN.into(),
        std::iter::repeat_n(Some(stamp), height),
    )?;
    columns.push(extraction_time.into_column());

    let frame = DataFrame::new(columns)?;
    tracing::debug!(rows = frame.height(), columns = frame.width(), "frame assembled");
    Ok(frame)
}
