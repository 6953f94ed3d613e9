//! Table Diff: a library for comparing tabular master-data snapshots.
//!
//! This crate provides functionality for:
//! - Loading spreadsheet files (`.xlsx`, `.csv`) into typed in-memory tables
//! - Classifying every row of a base/candidate pair as unchanged, changed,
//!   new, or missing, keyed by a chosen column or by row position
//! - Attributing changes to individual cells, with numeric tolerance and
//!   whitespace-normalized text comparison
//! - Exporting the result to a workbook with changed cells highlighted
//!
//! # Quick Start
//!
//! ```ignore
//! use table_diff::{diff_tables, read_table_from_path, DiffConfig, KeyDescriptor};
//!
//! let base = read_table_from_path("base.xlsx")?;
//! let candidate = read_table_from_path("candidate.xlsx")?;
//! let result = diff_tables(&base, &candidate, &KeyDescriptor::column("ID"), &DiffConfig::default())?;
//!
//! for row in &result.changed_rows {
//!     println!("changed: {}", row.key);
//! }
//! ```

mod addressing;
mod compare;
mod config;
mod engine;
pub mod error_codes;
mod export;
pub(crate) mod hashing;
mod ingest;
mod key;
mod result;
mod table;

pub use addressing::{address_to_index, index_to_address};
pub use compare::{CellVerdict, compare_cells};
pub use config::{ConfigError, DiffConfig, DiffConfigBuilder, DEFAULT_NUMERIC_TOLERANCE};
pub use engine::diff_tables;
pub use export::{ExportError, write_xlsx_report, write_xlsx_report_to_path};
pub use ingest::{
    ContainerError, ContainerLimits, IngestError, SheetParseError, SourceFormat, XlsxContainer,
    read_csv_table, read_table_from_path, read_table_with_limits, read_xlsx_table,
};
pub use key::{KeyDescriptor, Side};
pub use result::{AmbiguousKeyWarning, ChangedRow, DiffError, DiffResult, format_value};
pub use table::{ColumnType, Table, TableBuilder, TableError, Value};
