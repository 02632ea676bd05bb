//! Turns uploaded bytes into a [`RawTable`]: a grid of text cells whose row
//! numbers match the rows of the source sheet.

use std::{io::Cursor, iter};

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use csv::StringRecord;
use encoding_rs::Encoding;
use log::debug;

use crate::{error::IngestError, io_utils};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Spreadsheet,
    Delimited { delimiter: u8 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_str_rows(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(|row| row.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of the widest row at or after `start`.
    pub fn width_from(&self, start: usize) -> usize {
        self.rows
            .iter()
            .skip(start)
            .map(|row| row.len())
            .max()
            .unwrap_or(0)
    }
}

/// Reads a cell, treating cells past the end of a short row as blank.
pub fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(|s| s.as_str()).unwrap_or("")
}

pub fn row_is_blank(row: &[String]) -> bool {
    row.iter().all(|value| value.trim().is_empty())
}

pub fn read_table(
    bytes: &[u8],
    format: InputFormat,
    encoding: &'static Encoding,
) -> Result<RawTable, IngestError> {
    match format {
        InputFormat::Spreadsheet => read_spreadsheet(bytes),
        InputFormat::Delimited { delimiter } => read_delimited(bytes, delimiter, encoding),
    }
}

fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable, IngestError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(IngestError::file_read)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::file_read("workbook has no worksheets"))?
        .map_err(IngestError::file_read)?;
    let table = range_to_table(&range);
    debug!(
        "Read {} row(s) from the first worksheet ({} column(s))",
        table.len(),
        table.width_from(0)
    );
    Ok(table)
}

// calamine trims the range to its first used cell; pad it back so row and
// column positions match the sheet.
fn range_to_table(range: &Range<Data>) -> RawTable {
    let (top, left) = range
        .start()
        .map(|(row, col)| (row as usize, col as usize))
        .unwrap_or((0, 0));
    let mut rows = vec![Vec::new(); top];
    for source in range.rows() {
        let mut row = vec![String::new(); left];
        row.extend(source.iter().map(cell_to_string));
        rows.push(row);
    }
    RawTable::new(rows)
}

pub fn cell_to_string(value: &Data) -> String {
    match value {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|parsed| parsed.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| format_float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn read_delimited(
    bytes: &[u8],
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable, IngestError> {
    let text = io_utils::decode_bytes(bytes, encoding).map_err(IngestError::file_read)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    let mut reader = io_utils::open_csv_reader(text.as_bytes(), delimiter, false);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut record = StringRecord::new();
    let mut consumed = 0;
    while reader
        .read_record(&mut record)
        .map_err(|err| IngestError::file_read(format!("line {}: {err}", rows.len() + 1)))?
    {
        // The reader drops empty lines; keep them as blank rows so offsets
        // still count rows of the file.
        let start = text[consumed..]
            .find(|c: char| c != '\r' && c != '\n')
            .map_or(text.len(), |idx| consumed + idx);
        let gap_start = text[..start].trim_end_matches(['\r', '\n']).len();
        let breaks = line_breaks(&text[gap_start..start]);
        let blank_lines = if rows.is_empty() {
            breaks
        } else {
            breaks.saturating_sub(1)
        };
        rows.extend(iter::repeat_n(Vec::new(), blank_lines));
        rows.push(record.iter().map(|field| field.to_string()).collect());
        consumed = reader.position().byte() as usize;
    }
    Ok(RawTable::new(rows))
}

// Counts CRLF, LF and lone CR terminators.
fn line_breaks(text: &str) -> usize {
    let bytes = text.as_bytes();
    bytes
        .iter()
        .enumerate()
        .filter(|&(idx, &byte)| {
            byte == b'\n' || (byte == b'\r' && bytes.get(idx + 1) != Some(&b'\n'))
        })
        .count()
}
