use log::debug;
use serde::Serialize;

use crate::{config::HeaderRules, workbook::RawTable};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderDetection {
    /// Number of rows skipped before the header row.
    pub offset: usize,
    pub columns: Vec<String>,
    pub fell_back: bool,
}

/// One header position to try.
#[derive(Debug, Clone, Copy)]
pub struct HeaderCandidate {
    pub offset: usize,
}

impl HeaderCandidate {
    /// Column names when the header sits at this candidate's offset; `None`
    /// when the table has no such row.
    pub fn columns(&self, table: &RawTable) -> Option<Vec<String>> {
        table.row(self.offset)?;
        Some(column_names(table, self.offset))
    }

    pub fn accepts(&self, columns: &[String], tokens: &[String]) -> bool {
        let joined = columns
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");
        tokens
            .iter()
            .any(|token| joined.contains(&token.to_lowercase()))
    }
}

/// Tries each candidate offset in order and takes the first row whose joined
/// column names contain a header token, else the fallback offset.
pub fn detect_header_row(table: &RawTable, rules: &HeaderRules) -> HeaderDetection {
    let candidates = rules
        .candidate_offsets
        .iter()
        .map(|&offset| HeaderCandidate { offset });
    for candidate in candidates {
        let Some(columns) = candidate.columns(table) else {
            debug!("No row at header offset {}", candidate.offset);
            continue;
        };
        if candidate.accepts(&columns, &rules.tokens) {
            debug!(
                "Header offset {} accepted: {:?}",
                candidate.offset, columns
            );
            return HeaderDetection {
                offset: candidate.offset,
                columns,
                fell_back: false,
            };
        }
        debug!("Header offset {} rejected: {:?}", candidate.offset, columns);
    }
    HeaderDetection {
        offset: rules.fallback_offset,
        columns: column_names(table, rules.fallback_offset),
        fell_back: true,
    }
}

/// Header detection for a caller-supplied offset.
pub fn header_at(table: &RawTable, offset: usize) -> HeaderDetection {
    HeaderDetection {
        offset,
        columns: column_names(table, offset),
        fell_back: false,
    }
}

/// Builds column names from the row at `offset`, spanning the widest row
/// from there on. Blank names become `Unnamed: <index>` and repeated names
/// gain `.1`, `.2`… suffixes.
pub fn column_names(table: &RawTable, offset: usize) -> Vec<String> {
    let Some(header) = table.row(offset) else {
        return Vec::new();
    };
    let width = table.width_from(offset);
    let mut names: Vec<String> = Vec::with_capacity(width);
    for idx in 0..width {
        let raw = header.get(idx).map(|s| s.trim()).unwrap_or("");
        let base = if raw.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            raw.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}
