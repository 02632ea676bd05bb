#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

pub const PO_HEADER: &str = "PO#,DATE,NAME,QTY,UNIT,DESCRIPTION,UNIT PRICE";

/// Purchase-order export with a title banner above the header, the way the
/// accounting system writes it (header after four rows).
pub const BANNERED_ORDERS: &str = "\
Wonderzyme Trading Corp.,,,,,,
Purchase Order Register,,,,,,
,,,,,,
,,,,,,
PO#,DATE,NAME,QTY,UNIT,DESCRIPTION,UNIT PRICE
1001,2024-01-01,Acme,10,pcs,Widget A,10.00
1002,2024-03-01,Acme,5,pcs,Widget A,12.50
1003,2024-02-01,Globex,8,pcs,Widget A,11.75
1004,02/15/2024,Globex,2,box,Gear B,1234.5
1005,not a date,Initech,1,kg,Sprocket,3.333
,,,,,,
1006,2024-02-10,Acme,4,pcs,,9.99
";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}

/// Builds a cell grid with `offset` banner rows above `header`.
pub fn grid_with_header_at(offset: usize, header: &[&str], data: &[&[&str]]) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for idx in 0..offset {
        if idx == 0 {
            rows.push(vec!["Monthly Purchase Report".to_string()]);
        } else {
            rows.push(Vec::new());
        }
    }
    rows.push(header.iter().map(|h| h.to_string()).collect());
    for row in data {
        rows.push(row.iter().map(|c| c.to_string()).collect());
    }
    rows
}

/// A cell written into a generated workbook. `Date` holds an Excel serial day
/// number and is stored with the built-in short date format.
#[derive(Debug, Clone, Copy)]
pub enum SheetCell<'a> {
    Blank,
    Text(&'a str),
    Number(f64),
    Date(f64),
}

/// Builds a single-sheet xlsx file in memory.
pub fn xlsx_workbook(rows: &[&[SheetCell]]) -> Vec<u8> {
    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    let mut sheet = format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{MAIN_NS}"><sheetData>"#);
    for (row_idx, row) in rows.iter().enumerate() {
        let row_number = row_idx + 1;
        sheet.push_str(&format!(r#"<row r="{row_number}">"#));
        for (col_idx, cell) in row.iter().enumerate() {
            let reference = format!("{}{row_number}", column_letter(col_idx));
            match cell {
                SheetCell::Blank => {}
                SheetCell::Text(text) => sheet.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{text}</t></is></c>"#
                )),
                SheetCell::Number(value) => {
                    sheet.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#))
                }
                SheetCell::Date(serial) => {
                    sheet.push_str(&format!(r#"<c r="{reference}" s="1"><v>{serial}</v></c>"#))
                }
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#),
        ),
        (
            "xl/workbook.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets><sheet name="Orders" sheetId="1" r:id="rId1"/></sheets></workbook>"#),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{REL_NS}/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{REL_NS}/styles" Target="styles.xml"/></Relationships>"#),
        ),
        (
            "xl/styles.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{MAIN_NS}"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs></styleSheet>"#),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in parts {
        zip.start_file(name, options).expect("start workbook part");
        zip.write_all(body.as_bytes()).expect("write workbook part");
    }
    zip.finish().expect("finish workbook").into_inner()
}

fn column_letter(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Excel serial day numbers for the dates used in the workbook fixtures.
pub const SERIAL_2024_01_01: f64 = 45292.0;
pub const SERIAL_2024_02_01: f64 = 45323.0;
pub const SERIAL_2024_03_01: f64 = 45352.0;

/// Purchase-order register as a workbook: a title banner, three empty rows,
/// then the header on the fifth row.
pub fn bannered_orders_workbook() -> Vec<u8> {
    use SheetCell::{Blank, Date, Number, Text};
    xlsx_workbook(&[
        &[Text("Purchase Order Register")],
        &[],
        &[],
        &[Blank, Blank],
        &[
            Text("PO#"),
            Text("DATE"),
            Text("NAME"),
            Text("QTY"),
            Text("UNIT"),
            Text("DESCRIPTION"),
            Text("UNIT PRICE"),
        ],
        &[
            Number(1001.0),
            Date(SERIAL_2024_01_01),
            Text("Acme"),
            Number(10.0),
            Text("pcs"),
            Text("Widget A"),
            Number(10.0),
        ],
        &[
            Number(1002.0),
            Date(SERIAL_2024_03_01),
            Text("Acme"),
            Number(5.0),
            Text("pcs"),
            Text("Widget A"),
            Number(12.5),
        ],
        &[
            Number(1003.0),
            Date(SERIAL_2024_02_01),
            Text("Globex"),
            Number(8.0),
            Text("pcs"),
            Text("Widget A"),
            Number(11.75),
        ],
    ])
}
