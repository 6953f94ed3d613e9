//! Delimited text (`.csv`) ingestion.
//!
//! Same contract as the Open XML path: trimmed headers, empty fields are
//! absent values. Fields that parse as numbers become numeric cells so the
//! two ingestion paths agree on types and key canonicalization.

use super::IngestError;
use crate::table::{Table, TableBuilder, Value};
use std::io::Read;

/// Read a table from a CSV byte source. The first record is the header row.
pub fn read_table<R: Read>(reader: R) -> Result<Table, IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MissingHeaderRow);
    }

    let mut builder = TableBuilder::new(headers)?;
    for record in csv_reader.records() {
        let record = record?;
        let cells: Vec<Option<Value>> = record.iter().map(parse_field).collect();
        builder.push_row(cells)?;
    }
    Ok(builder.finish())
}

fn parse_field(field: &str) -> Option<Value> {
    if field.is_empty() {
        return None;
    }
    match field.trim().parse::<f64>() {
        Ok(n) => Some(Value::Number(n)),
        Err(_) => Some(Value::Text(field.to_string())),
    }
}
