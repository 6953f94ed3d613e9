use crate::OutputFormat;
use crate::output::{json, text};
use anyhow::{Context, Result};
use std::io;
use std::process::ExitCode;
use table_diff::{
    DiffConfig, DiffResult, KeyDescriptor, diff_tables, read_table_from_path,
    write_xlsx_report_to_path,
};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    base_path: &str,
    candidate_path: &str,
    key: Option<String>,
    format: OutputFormat,
    tolerance: Option<f64>,
    case_insensitive: bool,
    export: Option<String>,
    quiet: bool,
    verbose: bool,
) -> Result<ExitCode> {
    let verbosity = if quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let config = build_config(tolerance, case_insensitive)?;

    let base = read_table_from_path(base_path)
        .with_context(|| format!("Failed to read base file: {}", base_path))?;
    let candidate = read_table_from_path(candidate_path)
        .with_context(|| format!("Failed to read candidate file: {}", candidate_path))?;

    let key = match key {
        Some(name) => KeyDescriptor::column(name),
        None => KeyDescriptor::Positional,
    };

    let result = diff_tables(&base, &candidate, &key, &config)
        .context("Comparison failed")?;

    print_warnings_to_stderr(&result);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match format {
        OutputFormat::Text => {
            text::write_report(&mut handle, &result, base_path, candidate_path, verbosity)?;
        }
        OutputFormat::Json => {
            json::write_report(&mut handle, &result)?;
        }
    }

    if let Some(path) = export {
        write_xlsx_report_to_path(&result, &path)
            .with_context(|| format!("Failed to write report workbook: {}", path))?;
        if verbosity != Verbosity::Quiet {
            eprintln!("Report written to {}", path);
        }
    }

    Ok(exit_code_from_result(&result))
}

fn build_config(tolerance: Option<f64>, case_insensitive: bool) -> Result<DiffConfig> {
    let mut builder = DiffConfig::builder().case_insensitive(case_insensitive);
    if let Some(t) = tolerance {
        builder = builder.numeric_tolerance(t);
    }
    builder.build().context("Invalid configuration")
}

fn print_warnings_to_stderr(result: &DiffResult) {
    for warning in &result.warnings {
        eprintln!("Warning: {}", warning);
    }
}

fn exit_code_from_result(result: &DiffResult) -> ExitCode {
    if result.is_empty() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}
