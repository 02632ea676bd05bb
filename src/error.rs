//! Fatal ingest errors and the non-fatal diagnostics collected alongside a
//! successful load.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::Field;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("could not read the uploaded file: {reason}")]
    FileRead { reason: String },
    #[error("no valid data rows found after skipping {offset} row(s)")]
    NoValidRows { offset: usize },
    #[error("invalid normalizer configuration: {0}")]
    Config(String),
}

impl IngestError {
    pub fn file_read(reason: impl fmt::Display) -> Self {
        IngestError::FileRead {
            reason: reason.to_string(),
        }
    }

    /// Suggestion shown to the user next to the error message.
    pub fn hint(&self) -> &'static str {
        match self {
            IngestError::FileRead { .. } => {
                "Ensure the file isn't open elsewhere and is a supported spreadsheet or CSV file."
            }
            IngestError::NoValidRows { .. } => {
                "Try a different header offset with --skip-rows (3, 5 or 6 are common)."
            }
            IngestError::Config(_) => "Check the normalizer configuration file.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    HeaderDetectionFallback {
        offset: usize,
    },
    ColumnMappingFallback {
        field: Field,
        index: usize,
    },
    UnparseableValue {
        field: Field,
        count: usize,
        example: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::HeaderDetectionFallback { offset } => write!(
                f,
                "No header row matched known tokens; skipped {offset} row(s). If columns are wrong, try --skip-rows 3, 5 or 6"
            ),
            Diagnostic::ColumnMappingFallback { field, index } => write!(
                f,
                "No column name matched {field}; using column #{index} by position"
            ),
            Diagnostic::UnparseableValue {
                field,
                count,
                example,
            } => write!(
                f,
                "{count} {field} value(s) could not be parsed (e.g. '{example}') and are shown as invalid"
            ),
        }
    }
}
