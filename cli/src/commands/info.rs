use anyhow::{Context, Result};
use std::process::ExitCode;
use table_diff::read_table_from_path;

pub fn run(path: &str) -> Result<ExitCode> {
    let table =
        read_table_from_path(path).with_context(|| format!("Failed to read file: {}", path))?;

    println!("File: {}", path);
    println!("Rows: {}", table.n_rows());
    println!("Columns ({}):", table.n_columns());
    for (name, column_type) in table.columns().iter().zip(table.types()) {
        println!("  {} ({})", name, column_type);
    }

    Ok(ExitCode::from(0))
}
