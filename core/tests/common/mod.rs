//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use table_diff::{Table, TableBuilder, Value};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// One fixture cell.
#[derive(Debug, Clone)]
pub enum Cell {
    N(f64),
    S(&'static str),
    B(bool),
    Empty,
}

pub fn num(n: f64) -> Option<Value> {
    Some(Value::Number(n))
}

pub fn text(s: &str) -> Option<Value> {
    Some(Value::Text(s.to_string()))
}

pub fn table(columns: &[&str], rows: Vec<Vec<Option<Value>>>) -> Table {
    let mut builder = TableBuilder::new(columns.iter().map(|c| c.to_string()).collect())
        .expect("fixture columns should be valid");
    for row in rows {
        builder.push_row(row).expect("fixture rows should be rectangular");
    }
    builder.finish()
}

/// Build an in-memory `.xlsx` workbook with a single worksheet. Text cells
/// go through a shared-string table, exercising the same path real files
/// take.
pub fn xlsx_bytes(rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut shared: Vec<String> = Vec::new();
    let mut shared_index = |s: &str| -> usize {
        if let Some(idx) = shared.iter().position(|x| x == s) {
            idx
        } else {
            shared.push(s.to_string());
            shared.len() - 1
        }
    };

    let mut sheet = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
         <sheetData>",
    );
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, cell) in row.iter().enumerate() {
            let addr = table_diff::index_to_address(r as u32, c as u32);
            match cell {
                Cell::N(n) => sheet.push_str(&format!("<c r=\"{addr}\"><v>{n}</v></c>")),
                Cell::S(s) => {
                    let idx = shared_index(s);
                    sheet.push_str(&format!("<c r=\"{addr}\" t=\"s\"><v>{idx}</v></c>"));
                }
                Cell::B(b) => {
                    let v = if *b { 1 } else { 0 };
                    sheet.push_str(&format!("<c r=\"{addr}\" t=\"b\"><v>{v}</v></c>"));
                }
                Cell::Empty => {}
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let mut shared_xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <sst xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">",
    );
    for s in &shared {
        shared_xml.push_str(&format!("<si><t>{}</t></si>", quick_escape(s)));
    }
    shared_xml.push_str("</sst>");

    let workbook = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
         xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
         <sheets><sheet name=\"Datos\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>";

    let workbook_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"/>\
         </Relationships>";

    let content_types = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
         <Override PartName=\"/xl/worksheets/sheet1.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\
         </Types>";

    let root_rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
         <Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
         </Relationships>";

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let parts: [(&str, &str); 5] = [
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
        ("xl/worksheets/sheet1.xml", &sheet),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).expect("zip entry");
        zip.write_all(body.as_bytes()).expect("zip write");
    }
    if !shared.is_empty() {
        zip.start_file("xl/sharedStrings.xml", options)
            .expect("zip entry");
        zip.write_all(shared_xml.as_bytes()).expect("zip write");
    }
    zip.finish().expect("zip finish").into_inner()
}

fn quick_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
