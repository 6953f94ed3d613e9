//! Export: writing a [`DiffResult`] to a highlighted `.xlsx` workbook.
//!
//! The workbook carries one sheet per row classification (Changed / New /
//! Missing). Cells on the Changed sheet are shaded with a solid red fill
//! exactly where [`DiffResult::is_changed`] says so. The text renderer uses
//! the same predicate, so screen and file always agree.

use crate::result::DiffResult;
use crate::addressing::index_to_address;
use crate::table::Value;
use quick_xml::escape::escape;
use std::io::{Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP write error: {0}")]
    Zip(String),
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => ExportError::Io(e),
            other => ExportError::Zip(other.to_string()),
        }
    }
}

/// Index into `cellXfs` of the red-fill style; style 0 is the default.
const HIGHLIGHT_STYLE: u32 = 1;

/// Write the report workbook to any seekable sink.
pub fn write_xlsx_report<W: Write + Seek>(
    result: &DiffResult,
    writer: W,
) -> Result<(), ExportError> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(WORKBOOK.as_bytes())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELS.as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    zip.write_all(STYLES.as_bytes())?;

    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    zip.write_all(changed_sheet_xml(result).as_bytes())?;

    zip.start_file("xl/worksheets/sheet2.xml", options)?;
    zip.write_all(plain_sheet_xml(&result.columns, &result.new_rows).as_bytes())?;

    zip.start_file("xl/worksheets/sheet3.xml", options)?;
    zip.write_all(plain_sheet_xml(&result.columns, &result.missing_rows).as_bytes())?;

    zip.finish()?;
    Ok(())
}

/// Convenience wrapper writing the workbook to a file path.
pub fn write_xlsx_report_to_path(
    result: &DiffResult,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_xlsx_report(result, file)
}

fn changed_sheet_xml(result: &DiffResult) -> String {
    let mut xml = sheet_prologue();
    push_header_row(&mut xml, &result.columns);
    for (row_idx, changed) in result.changed_rows.iter().enumerate() {
        // Data starts on worksheet row 1 (row 0 holds the headers).
        let sheet_row = (row_idx + 1) as u32;
        xml.push_str(&format!("<row r=\"{}\">", sheet_row + 1));
        for (col_idx, verdict) in changed.cells.iter().enumerate() {
            push_cell(
                &mut xml,
                sheet_row,
                col_idx as u32,
                verdict.candidate_value(),
                result.is_changed(row_idx, col_idx),
            );
        }
        xml.push_str("</row>");
    }
    xml.push_str(SHEET_EPILOGUE);
    xml
}

fn plain_sheet_xml(columns: &[String], rows: &[Vec<Option<Value>>]) -> String {
    let mut xml = sheet_prologue();
    push_header_row(&mut xml, columns);
    for (row_idx, row) in rows.iter().enumerate() {
        let sheet_row = (row_idx + 1) as u32;
        xml.push_str(&format!("<row r=\"{}\">", sheet_row + 1));
        for (col_idx, value) in row.iter().enumerate() {
            push_cell(&mut xml, sheet_row, col_idx as u32, value.as_ref(), false);
        }
        xml.push_str("</row>");
    }
    xml.push_str(SHEET_EPILOGUE);
    xml
}

fn sheet_prologue() -> String {
    concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
        "<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">",
        "<sheetData>"
    )
    .to_string()
}

const SHEET_EPILOGUE: &str = "</sheetData></worksheet>";

fn push_header_row(xml: &mut String, columns: &[String]) {
    xml.push_str("<row r=\"1\">");
    for (col_idx, name) in columns.iter().enumerate() {
        let text = Value::Text(name.clone());
        push_cell(xml, 0, col_idx as u32, Some(&text), false);
    }
    xml.push_str("</row>");
}

fn push_cell(xml: &mut String, row: u32, col: u32, value: Option<&Value>, highlighted: bool) {
    let addr = index_to_address(row, col);
    let style = if highlighted {
        format!(" s=\"{HIGHLIGHT_STYLE}\"")
    } else {
        String::new()
    };

    match value {
        None => {
            // Absent cells only need a marker when they carry the highlight.
            if highlighted {
                xml.push_str(&format!("<c r=\"{addr}\"{style}/>"));
            }
        }
        Some(Value::Number(n)) if n.is_finite() => {
            xml.push_str(&format!("<c r=\"{addr}\"{style}><v>{n}</v></c>"));
        }
        Some(Value::Bool(b)) => {
            let v = if *b { 1 } else { 0 };
            xml.push_str(&format!("<c r=\"{addr}\"{style} t=\"b\"><v>{v}</v></c>"));
        }
        Some(v) => {
            // Text, and non-finite numbers that have no valid <v> form.
            let rendered = match v {
                Value::Text(s) => s.clone(),
                other => other.canonical_string(),
            };
            let escaped = escape(rendered.as_str());
            xml.push_str(&format!(
                "<c r=\"{addr}\"{style} t=\"inlineStr\"><is><t>{escaped}</t></is></c>"
            ));
        }
    }
}

const CONTENT_TYPES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
    "<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>",
    "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
    "<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>",
    "<Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
    "<Override PartName=\"/xl/worksheets/sheet2.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
    "<Override PartName=\"/xl/worksheets/sheet3.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
    "<Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>",
    "</Types>"
);

const ROOT_RELS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>",
    "</Relationships>"
);

const WORKBOOK: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" ",
    "xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">",
    "<sheets>",
    "<sheet name=\"Changed\" sheetId=\"1\" r:id=\"rId1\"/>",
    "<sheet name=\"New\" sheetId=\"2\" r:id=\"rId2\"/>",
    "<sheet name=\"Missing\" sheetId=\"3\" r:id=\"rId3\"/>",
    "</sheets>",
    "</workbook>"
);

const WORKBOOK_RELS: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
    "<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"/>",
    "<Relationship Id=\"rId2\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet2.xml\"/>",
    "<Relationship Id=\"rId3\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet3.xml\"/>",
    "<Relationship Id=\"rId4\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles\" Target=\"styles.xml\"/>",
    "</Relationships>"
);

const STYLES: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>",
    "<styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">",
    "<fonts count=\"1\"><font><sz val=\"11\"/><name val=\"Calibri\"/></font></fonts>",
    "<fills count=\"3\">",
    "<fill><patternFill patternType=\"none\"/></fill>",
    "<fill><patternFill patternType=\"gray125\"/></fill>",
    "<fill><patternFill patternType=\"solid\"><fgColor rgb=\"FFFF0000\"/><bgColor indexed=\"64\"/></patternFill></fill>",
    "</fills>",
    "<borders count=\"1\"><border><left/><right/><top/><bottom/><diagonal/></border></borders>",
    "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
    "<cellXfs count=\"2\">",
    "<xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>",
    "<xf numFmtId=\"0\" fontId=\"0\" fillId=\"2\" borderId=\"0\" xfId=\"0\" applyFill=\"1\"/>",
    "</cellXfs>",
    "</styleSheet>"
);
