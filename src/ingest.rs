use encoding_rs::Encoding;
use log::{info, warn};
use serde::Serialize;

use crate::{
    aggregate::{self, LatestPriceEntry},
    config::NormalizerConfig,
    error::{Diagnostic, IngestError},
    filter::{FilterSummary, PriceFilter},
    header::{self, HeaderDetection},
    mapping::{ColumnMapping, map_columns},
    normalize::{CanonicalRecord, build_records},
    workbook::{InputFormat, RawTable, read_table},
};

/// Everything the caller should be told about how an upload was read.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub header: HeaderDetection,
    pub mapping: ColumnMapping,
    pub rows_loaded: usize,
    pub blank_rows: usize,
    pub rows_without_product: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Normalized records of one upload. Views only borrow from it, so loading
/// another file means building another book.
#[derive(Debug, Clone)]
pub struct PriceBook {
    records: Vec<CanonicalRecord>,
    report: IngestReport,
}

impl PriceBook {
    pub fn load(
        bytes: &[u8],
        format: InputFormat,
        encoding: &'static Encoding,
        config: &NormalizerConfig,
        header_override: Option<usize>,
    ) -> Result<Self, IngestError> {
        let table = read_table(bytes, format, encoding)?;
        Self::from_table(&table, config, header_override)
    }

    pub fn from_table(
        table: &RawTable,
        config: &NormalizerConfig,
        header_override: Option<usize>,
    ) -> Result<Self, IngestError> {
        let header = match header_override {
            Some(offset) => header::header_at(table, offset),
            None => header::detect_header_row(table, &config.header),
        };
        let mut diagnostics = Vec::new();
        if header.fell_back {
            diagnostics.push(Diagnostic::HeaderDetectionFallback {
                offset: header.offset,
            });
        }
        info!(
            "Headers detected after skipping {} row(s): {:?}",
            header.offset, header.columns
        );

        let mapping = map_columns(&header.columns, &config.fields);
        diagnostics.extend(mapping.fallbacks().map(|binding| {
            Diagnostic::ColumnMappingFallback {
                field: binding.field,
                index: binding.index,
            }
        }));
        info!(
            "Detected -> Product: {} | Price: {} | Date: {} | Supplier: {}",
            mapping.product.label(),
            mapping.price.label(),
            mapping.date.label(),
            mapping.supplier.label()
        );

        let outcome = build_records(table, &header, &mapping)?;
        diagnostics.extend(outcome.diagnostics);
        for diagnostic in &diagnostics {
            warn!("{diagnostic}");
        }

        let report = IngestReport {
            header,
            mapping,
            rows_loaded: outcome.records.len(),
            blank_rows: outcome.blank_rows,
            rows_without_product: outcome.rows_without_product,
            diagnostics,
        };
        info!("Loaded {} purchase order row(s)", report.rows_loaded);
        Ok(Self {
            records: outcome.records,
            report,
        })
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn latest_prices(&self) -> Vec<LatestPriceEntry<'_>> {
        aggregate::latest_prices(&self.records)
    }

    pub fn filtered_latest_prices(
        &self,
        filter: &PriceFilter,
    ) -> (Vec<LatestPriceEntry<'_>>, FilterSummary) {
        filter.apply(&self.latest_prices())
    }

    pub fn history(&self, product: &str) -> Vec<&CanonicalRecord> {
        aggregate::history(&self.records, product)
    }

    pub fn products(&self) -> Vec<&str> {
        aggregate::distinct_products(&self.records)
    }

    pub fn suppliers(&self) -> Vec<&str> {
        aggregate::distinct_suppliers(&self.records)
    }
}
