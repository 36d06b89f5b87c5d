//! Reading query rows from CSV or JSON files.

use crate::error::{ChoroplethError, Result};
use crate::models::Row;
use csv::ReaderBuilder;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read rows from CSV with header. Every cell is kept as a string; numeric coercion happens
/// at join time.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Read rows from JSON: either an array of objects or `{ "rows": [...] }`
/// (the shape of a query result).
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let text = fs::read_to_string(path)?;
    let v: Value = serde_json::from_str(&text)?;
    let items = match v {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("rows") {
            Some(Value::Array(items)) => items,
            _ => return Err(ChoroplethError::invalid("rows", "expected a `rows` array")),
        },
        _ => {
            return Err(ChoroplethError::invalid(
                "rows",
                "expected an array of objects",
            ));
        }
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(row) => Ok(row),
            other => Err(ChoroplethError::invalid(
                "rows",
                format!("row is not an object: {other}"),
            )),
        })
        .collect()
}

/// Pick the reader by file extension (`.json` -> JSON, anything else -> CSV).
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Row>> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase) {
        Some(ext) if ext == "json" => load_json(path),
        _ => load_csv(path),
    }
}
