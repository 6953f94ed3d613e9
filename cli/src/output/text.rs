use crate::commands::diff::Verbosity;
use anyhow::Result;
use std::io::Write;
use table_diff::{DiffResult, Value, format_value};

pub fn write_report<W: Write>(
    w: &mut W,
    result: &DiffResult,
    base_path: &str,
    candidate_path: &str,
    verbosity: Verbosity,
) -> Result<()> {
    if verbosity != Verbosity::Quiet {
        let identity = match &result.key_column {
            Some(key) => format!("key: {}", key),
            None => "positional".to_string(),
        };
        writeln!(
            w,
            "Comparing {} -> {} ({})",
            base_path, candidate_path, identity
        )?;
        writeln!(w)?;
    }

    if result.is_empty() {
        writeln!(w, "No differences found.")?;
        write_summary(w, result)?;
        return Ok(());
    }

    if verbosity != Verbosity::Quiet {
        write_changed_rows(w, result, verbosity)?;
        write_row_block(w, "New rows", &result.new_rows, &result.columns)?;
        write_row_block(w, "Missing rows", &result.missing_rows, &result.columns)?;
    }

    write_summary(w, result)?;
    Ok(())
}

fn write_changed_rows<W: Write>(
    w: &mut W,
    result: &DiffResult,
    verbosity: Verbosity,
) -> Result<()> {
    if result.changed_rows.is_empty() {
        return Ok(());
    }

    writeln!(w, "Changed rows ({}):", result.changed_rows.len())?;
    for (row_idx, changed) in result.changed_rows.iter().enumerate() {
        writeln!(w, "  Key \"{}\" (candidate row {}):", changed.key, changed.row + 1)?;

        if verbosity == Verbosity::Verbose {
            // Full row with the `*` marker on changed cells.
            let rendered: Vec<String> = result
                .columns
                .iter()
                .enumerate()
                .map(|(col_idx, name)| {
                    format!("{}={}", name, result.marked_value(row_idx, col_idx))
                })
                .collect();
            writeln!(w, "    {}", rendered.join(", "))?;
        }

        for (col_idx, name) in result.columns.iter().enumerate() {
            if let table_diff::CellVerdict::Changed { from, to } = &changed.cells[col_idx] {
                writeln!(
                    w,
                    "    {}: {} -> {}",
                    name,
                    render_or_blank(from.as_ref()),
                    render_or_blank(to.as_ref())
                )?;
            }
        }
    }
    writeln!(w)?;
    Ok(())
}

fn write_row_block<W: Write>(
    w: &mut W,
    label: &str,
    rows: &[Vec<Option<Value>>],
    columns: &[String],
) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    writeln!(w, "{} ({}):", label, rows.len())?;
    for row in rows {
        let rendered: Vec<String> = columns
            .iter()
            .zip(row)
            .map(|(name, value)| format!("{}={}", name, format_value(value.as_ref())))
            .collect();
        writeln!(w, "  {}", rendered.join(", "))?;
    }
    writeln!(w)?;
    Ok(())
}

fn write_summary<W: Write>(w: &mut W, result: &DiffResult) -> Result<()> {
    writeln!(
        w,
        "Summary: {} changed, {} new, {} missing, {} unchanged",
        result.changed_rows.len(),
        result.new_rows.len(),
        result.missing_rows.len(),
        result.unchanged_count
    )?;
    Ok(())
}

fn render_or_blank(value: Option<&Value>) -> String {
    let rendered = format_value(value);
    if rendered.is_empty() {
        "<absent>".to_string()
    } else {
        rendered
    }
}
