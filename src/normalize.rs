//! Row cleaning and type coercion into [`CanonicalRecord`]s.
//!
//! Numeric and date cells that fail to parse become `None` instead of
//! failing the row; the failures are tallied per field so the caller can
//! surface them. Rows are dropped only when they are blank or have no
//! product.

use chrono::NaiveDateTime;
use log::debug;
use serde::Serialize;

use crate::{
    config::Field,
    data::{non_blank, parse_number, parse_order_date},
    error::{Diagnostic, IngestError},
    header::HeaderDetection,
    mapping::{ColumnBinding, ColumnMapping},
    workbook::{RawTable, cell, row_is_blank},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub product: String,
    pub supplier: Option<String>,
    pub unit_price: Option<f64>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub order_date: Option<NaiveDateTime>,
    /// Date cell as it appeared in the upload.
    pub raw_date: String,
    /// Zero-based row in the source sheet.
    pub source_row: usize,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub records: Vec<CanonicalRecord>,
    pub blank_rows: usize,
    pub rows_without_product: usize,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default)]
struct ParseFailures {
    count: usize,
    example: Option<String>,
}

impl ParseFailures {
    fn record(&mut self, raw: &str) {
        self.count += 1;
        if self.example.is_none() {
            self.example = Some(raw.trim().to_string());
        }
    }

    fn into_diagnostic(self, field: Field) -> Option<Diagnostic> {
        (self.count > 0).then(|| Diagnostic::UnparseableValue {
            field,
            count: self.count,
            example: self.example.unwrap_or_default(),
        })
    }
}

fn mapped<'a>(row: &'a [String], binding: &ColumnBinding) -> &'a str {
    cell(row, binding.index)
}

/// Converts the data rows below the detected header into canonical records,
/// preserving source order.
///
/// Returns [`IngestError::NoValidRows`] when nothing survives cleaning.
pub fn build_records(
    table: &RawTable,
    header: &HeaderDetection,
    mapping: &ColumnMapping,
) -> Result<BuildOutcome, IngestError> {
    let mut outcome = BuildOutcome::default();
    let mut price_failures = ParseFailures::default();
    let mut quantity_failures = ParseFailures::default();
    let mut date_failures = ParseFailures::default();

    for (source_row, row) in table.rows().iter().enumerate().skip(header.offset + 1) {
        if row_is_blank(row) {
            outcome.blank_rows += 1;
            continue;
        }
        let Some(product) = non_blank(mapped(row, &mapping.product)) else {
            outcome.rows_without_product += 1;
            continue;
        };

        let raw_price = mapped(row, &mapping.price);
        let unit_price = parse_number(raw_price).unwrap_or_else(|_| {
            price_failures.record(raw_price);
            None
        });
        let raw_quantity = mapped(row, &mapping.quantity);
        let quantity = parse_number(raw_quantity).unwrap_or_else(|_| {
            quantity_failures.record(raw_quantity);
            None
        });
        let raw_date = mapped(row, &mapping.date);
        let order_date = parse_order_date(raw_date).unwrap_or_else(|_| {
            date_failures.record(raw_date);
            None
        });

        outcome.records.push(CanonicalRecord {
            product,
            supplier: non_blank(mapped(row, &mapping.supplier)),
            unit_price,
            quantity,
            unit: non_blank(mapped(row, &mapping.unit)),
            order_date,
            raw_date: raw_date.trim().to_string(),
            source_row,
        });
    }

    debug!(
        "Kept {} row(s); dropped {} blank and {} without a product",
        outcome.records.len(),
        outcome.blank_rows,
        outcome.rows_without_product
    );

    if outcome.records.is_empty() {
        return Err(IngestError::NoValidRows {
            offset: header.offset,
        });
    }

    outcome.diagnostics.extend(
        [
            price_failures.into_diagnostic(Field::Price),
            quantity_failures.into_diagnostic(Field::Quantity),
            date_failures.into_diagnostic(Field::Date),
        ]
        .into_iter()
        .flatten(),
    );
    Ok(outcome)
}
