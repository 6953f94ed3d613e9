//! Open XML (`.xlsx`) ingestion.
//!
//! Opens the first worksheet of a workbook, takes row 0 as the header row,
//! and assembles a [`Table`]. Header names are trimmed here, so the engine
//! never sees a `"ID "` vs `"ID"` mismatch.

use super::container::{ContainerLimits, XlsxContainer};
use super::sheet_parser::{
    parse_relationships, parse_shared_strings, parse_sheet_rows, parse_workbook_sheets,
    resolve_sheet_target,
};
use super::IngestError;
use crate::table::{Table, TableBuilder, Value};
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Read a table from an `.xlsx` byte source.
pub fn read_table<R: Read + Seek + 'static>(reader: R) -> Result<Table, IngestError> {
    read_table_with_limits(reader, ContainerLimits::default())
}

pub fn read_table_with_limits<R: Read + Seek + 'static>(
    reader: R,
    limits: ContainerLimits,
) -> Result<Table, IngestError> {
    let mut container = XlsxContainer::open_from_reader_with_limits(reader, limits)?;

    let shared_strings = match container.read_file_optional("xl/sharedStrings.xml")? {
        Some(bytes) => parse_shared_strings(&bytes)?,
        None => Vec::new(),
    };

    let workbook_bytes = container
        .read_file("xl/workbook.xml")
        .map_err(|_| IngestError::WorkbookXmlMissing)?;
    let sheets = parse_workbook_sheets(&workbook_bytes)?;
    let first = sheets.first().ok_or(IngestError::NoWorksheet)?;

    let relationships = match container.read_file_optional("xl/_rels/workbook.xml.rels")? {
        Some(bytes) => parse_relationships(&bytes)?,
        None => HashMap::new(),
    };

    let target = resolve_sheet_target(first, &relationships, 0);
    let sheet_bytes =
        container
            .read_file(&target)
            .map_err(|_| IngestError::WorksheetXmlMissing {
                sheet_name: first.name.clone(),
            })?;

    let rows = parse_sheet_rows(&sheet_bytes, &shared_strings)?;
    table_from_rows(rows)
}

/// Build a table from dense sheet rows: row 0 is the header row, the rest is
/// data.
pub(crate) fn table_from_rows(rows: Vec<Vec<Option<Value>>>) -> Result<Table, IngestError> {
    let mut rows = rows.into_iter();
    let header = rows.next().ok_or(IngestError::MissingHeaderRow)?;

    let columns: Vec<String> = header
        .iter()
        .map(|cell| match cell {
            Some(v) => v.canonical_string(),
            None => String::new(),
        })
        .collect();

    let mut builder = TableBuilder::new(columns)?;
    for row in rows {
        builder.push_row(row)?;
    }
    Ok(builder.finish())
}
