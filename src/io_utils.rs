//! I/O utilities for loading uploads and writing rendered views.
//!
//! - **Format resolution**: extension-based (`.xlsx`/`.xls`/`.ods`… →
//!   spreadsheet, `.csv` → comma, `.tsv` → tab) with byte sniffing when the
//!   extension says nothing.
//! - **Encoding**: delimited inputs are decoded via `encoding_rs`, defaulting
//!   to UTF-8.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::{error::IngestError, workbook::InputFormat};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_format(path: &Path, bytes: &[u8]) -> InputFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext)
            if SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            InputFormat::Spreadsheet
        }
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => InputFormat::Delimited {
            delimiter: DEFAULT_TSV_DELIMITER,
        },
        Some(ext) if ext.eq_ignore_ascii_case("csv") => InputFormat::Delimited {
            delimiter: DEFAULT_CSV_DELIMITER,
        },
        _ => sniff_format(bytes),
    }
}

pub fn sniff_format(bytes: &[u8]) -> InputFormat {
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        InputFormat::Spreadsheet
    } else {
        InputFormat::Delimited {
            delimiter: DEFAULT_CSV_DELIMITER,
        }
    }
}

/// Reads the whole upload, refusing anything larger than `max_bytes`.
pub fn read_input(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(path).map_err(|err| {
            anyhow::Error::new(IngestError::file_read(err))
                .context(format!("Opening input file {path:?}"))
        })?)
    };
    let mut bytes = Vec::new();
    reader
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut bytes)
        .with_context(|| format!("Reading input file {path:?}"))?;
    if bytes.len() as u64 > max_bytes {
        return Err(IngestError::file_read(format!(
            "input is larger than the {max_bytes} byte limit"
        ))
        .into());
    }
    Ok(bytes)
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_writer<W>(writer: W) -> csv::Writer<W>
where
    W: Write,
{
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(DEFAULT_CSV_DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    builder.from_writer(writer)
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if !is_dash(p) => Ok(Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        ))),
        _ => Ok(Box::new(io::stdout())),
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}
