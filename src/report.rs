use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    aggregate::LatestPriceEntry, cli::OutputFormat, io_utils, normalize::CanonicalRecord, table,
};

pub const INVALID_DATE: &str = "Invalid Date";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestRow {
    pub product: String,
    pub supplier: Option<String>,
    pub latest_unit_price: Option<f64>,
    pub latest_date: String,
    pub qty: Option<f64>,
    pub unit: Option<String>,
}

impl LatestRow {
    pub fn from_entry(entry: &LatestPriceEntry<'_>) -> Self {
        let record = entry.record;
        Self {
            product: record.product.clone(),
            supplier: record.supplier.clone(),
            latest_unit_price: record.unit_price.map(round_price),
            latest_date: date_label(record.order_date),
            qty: record.quantity,
            unit: record.unit.clone(),
        }
    }

    fn cells(&self, currency: &str) -> Vec<String> {
        vec![
            self.product.clone(),
            self.supplier.clone().unwrap_or_default(),
            self.latest_unit_price
                .map(|p| format_currency(p, currency))
                .unwrap_or_default(),
            self.latest_date.clone(),
            self.qty.map(format_quantity).unwrap_or_default(),
            self.unit.clone().unwrap_or_default(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub date: String,
    pub source_date: String,
    pub supplier: Option<String>,
    pub qty: Option<f64>,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
}

impl HistoryRow {
    pub fn from_record(record: &CanonicalRecord) -> Self {
        Self {
            date: date_label(record.order_date),
            source_date: record.raw_date.clone(),
            supplier: record.supplier.clone(),
            qty: record.quantity,
            unit: record.unit.clone(),
            unit_price: record.unit_price.map(round_price),
        }
    }

    fn cells(&self, currency: &str) -> Vec<String> {
        vec![
            self.date.clone(),
            self.source_date.clone(),
            self.supplier.clone().unwrap_or_default(),
            self.qty.map(format_quantity).unwrap_or_default(),
            self.unit.clone().unwrap_or_default(),
            self.unit_price
                .map(|p| format_currency(p, currency))
                .unwrap_or_default(),
        ]
    }
}

const LATEST_HEADERS: &[&str] = &[
    "Product",
    "Supplier",
    "Latest Unit Price",
    "Latest Date",
    "Qty",
    "Unit",
];

const HISTORY_HEADERS: &[&str] = &["Date", "Source Date", "Supplier", "Qty", "Unit", "Unit Price"];

pub fn round_price(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

pub fn date_label(value: Option<NaiveDateTime>) -> String {
    match value {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Formats `value` as `<symbol> 1,234.50`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", round_price(value).abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && round_price(value) != 0.0 {
        "-"
    } else {
        ""
    };
    if symbol.is_empty() {
        format!("{sign}{grouped}.{fraction}")
    } else {
        format!("{symbol} {sign}{grouped}.{fraction}")
    }
}

pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

pub fn write_latest<W: Write>(
    out: &mut W,
    rows: &[LatestRow],
    format: OutputFormat,
    currency: &str,
) -> Result<()> {
    write_rows(out, LATEST_HEADERS, rows, format, |row| row.cells(currency))
}

pub fn write_history<W: Write>(
    out: &mut W,
    rows: &[HistoryRow],
    format: OutputFormat,
    currency: &str,
) -> Result<()> {
    write_rows(out, HISTORY_HEADERS, rows, format, |row| row.cells(currency))
}

pub fn write_values<W: Write>(
    out: &mut W,
    header: &str,
    values: &[&str],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, values).context("Writing JSON output")?;
            writeln!(out)?;
        }
        OutputFormat::Table | OutputFormat::Csv => {
            let rows = values
                .iter()
                .map(|value| vec![value.to_string()])
                .collect::<Vec<_>>();
            write_cells(out, &[header], &rows, format)?;
        }
    }
    Ok(())
}

fn write_rows<W, T, F>(
    out: &mut W,
    headers: &[&str],
    rows: &[T],
    format: OutputFormat,
    cells: F,
) -> Result<()>
where
    W: Write,
    T: Serialize,
    F: Fn(&T) -> Vec<String>,
{
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows).context("Writing JSON output")?;
            writeln!(out)?;
            Ok(())
        }
        OutputFormat::Table | OutputFormat::Csv => {
            let rendered = rows.iter().map(cells).collect::<Vec<_>>();
            write_cells(out, headers, &rendered, format)
        }
    }
}

fn write_cells<W: Write>(
    out: &mut W,
    headers: &[&str],
    rows: &[Vec<String>],
    format: OutputFormat,
) -> Result<()> {
    let headers = headers.iter().map(|h| h.to_string()).collect::<Vec<_>>();
    if format == OutputFormat::Table {
        write!(out, "{}", table::render_table(&headers, rows))?;
        return Ok(());
    }
    let mut writer = io_utils::open_csv_writer(&mut *out);
    writer.write_record(&headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().context("Flushing CSV output")?;
    Ok(())
}
