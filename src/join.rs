//! Join query rows to region codes.

use crate::models::{Feature, Row, code_text};
use ahash::AHashMap;
use serde_json::Value;

/// A joined row: the code as it appeared in the data, its numeric value and the source row.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    pub code: String,
    pub value: f64,
    pub row: Row,
}

/// Region code -> joined datum. Lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct JoinedDataset {
    entries: AHashMap<String, Datum>,
}

impl JoinedDataset {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Datum> {
        self.entries.get(&normalize(code))
    }

    pub fn value(&self, code: &str) -> Option<f64> {
        self.get(code).map(|d| d.value)
    }

    /// Datum joined to `feature` through its `code_type` property.
    pub fn for_feature(&self, feature: &Feature, code_type: &str) -> Option<&Datum> {
        feature.code(code_type).and_then(|c| self.get(&c))
    }

    pub fn value_for_feature(&self, feature: &Feature, code_type: &str) -> Option<f64> {
        self.for_feature(feature, code_type).map(|d| d.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Datum> {
        self.entries.values()
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Numeric form of a cell: numbers as-is, strings parsed after trimming.
/// Non-finite results count as missing.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Build the code -> value lookup from query rows.
///
/// Rows without a code, or whose value is missing or not numeric, contribute nothing.
/// When a code repeats, the last row wins.
pub fn prepare_data(rows: &[Row], code_column: &str, value_column: &str) -> JoinedDataset {
    let mut entries = AHashMap::with_capacity(rows.len());
    if code_column.is_empty() || value_column.is_empty() {
        return JoinedDataset { entries };
    }

    for row in rows {
        let Some(code) = row.get(code_column).and_then(code_text) else {
            continue;
        };
        let Some(value) = row.get(value_column).and_then(numeric_value) else {
            continue;
        };
        entries.insert(
            normalize(&code),
            Datum {
                code,
                value,
                row: row.clone(),
            },
        );
    }

    log::debug!(
        "joined {} of {} rows on `{}` -> `{}`",
        entries.len(),
        rows.len(),
        code_column,
        value_column
    );
    JoinedDataset { entries }
}
