use anyhow::Result;
use std::io::Write;
use table_diff::DiffResult;

pub fn write_report<W: Write>(w: &mut W, result: &DiffResult) -> Result<()> {
    serde_json::to_writer(&mut *w, result)?;
    writeln!(w)?;
    Ok(())
}
