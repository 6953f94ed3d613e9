//! Ingestion: reading spreadsheet files into [`Table`]s.
//!
//! Two source formats are supported: Open XML workbooks (`.xlsx`) and
//! delimited text (`.csv`). Both honor the same contract: the first row is
//! the header row, header names are trimmed of surrounding whitespace, and
//! column types are inferred from the column's non-absent values.

mod container;
mod delimited;
mod open_xml;
mod sheet_parser;

pub use container::{ContainerError, ContainerLimits, XlsxContainer};
pub use delimited::read_table as read_csv_table;
pub use open_xml::{read_table as read_xlsx_table, read_table_with_limits};
pub use sheet_parser::SheetParseError;

use crate::table::{Table, TableError};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Errors raised while turning a byte source into a [`Table`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
    #[error("sheet parse error: {0}")]
    Sheet(#[from] SheetParseError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("workbook.xml missing or unreadable")]
    WorkbookXmlMissing,
    #[error("worksheet XML missing for sheet '{sheet_name}'")]
    WorksheetXmlMissing { sheet_name: String },
    #[error("workbook contains no worksheets")]
    NoWorksheet,
    #[error("source has no header row")]
    MissingHeaderRow,
    #[error("unsupported file extension '{extension}' (expected .xlsx or .csv)")]
    UnsupportedExtension { extension: String },
}

/// Source formats recognized by [`read_table_from_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<SourceFormat, IngestError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" => Ok(SourceFormat::Xlsx),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(IngestError::UnsupportedExtension { extension }),
        }
    }
}

/// Read a table from a file, dispatching on the extension.
pub fn read_table_from_path(path: impl AsRef<Path>) -> Result<Table, IngestError> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path)?;
    let file = File::open(path)?;
    match format {
        SourceFormat::Xlsx => read_xlsx_table(file),
        SourceFormat::Csv => read_csv_table(file),
    }
}
