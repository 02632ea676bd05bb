//! Normalizer configuration.
//!
//! The header tokens, the ordered alias table and the positional fallbacks
//! are tied to one purchase-order export layout. They live here as data so a
//! different layout only needs a YAML file, not a code change:
//!
//! ```yaml
//! header:
//!   candidate_offsets: [0, 3, 4, 5, 6]
//!   fallback_offset: 4
//! fields:
//!   supplier: { aliases: [vendor, name], fallback_index: 3 }
//! ```
//!
//! Any section left out keeps its default.

use std::{fmt, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₱";
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Product,
    Price,
    Date,
    Supplier,
    Quantity,
    Unit,
}

impl Field {
    /// Resolution order used by the column mapper.
    pub const ALL: [Field; 6] = [
        Field::Product,
        Field::Price,
        Field::Date,
        Field::Supplier,
        Field::Quantity,
        Field::Unit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Product => "product",
            Field::Price => "price",
            Field::Date => "date",
            Field::Supplier => "supplier",
            Field::Quantity => "quantity",
            Field::Unit => "unit",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub aliases: Vec<String>,
    pub fallback_index: usize,
}

impl FieldRule {
    fn new(aliases: &[&str], fallback_index: usize) -> Self {
        Self {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            fallback_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldRules {
    pub product: FieldRule,
    pub price: FieldRule,
    pub date: FieldRule,
    pub supplier: FieldRule,
    pub quantity: FieldRule,
    pub unit: FieldRule,
}

impl Default for FieldRules {
    fn default() -> Self {
        Self {
            product: FieldRule::new(&["description", "product", "desc"], 6),
            price: FieldRule::new(&["unit price", "price", "u/p"], 7),
            date: FieldRule::new(&["date", "po date", "order date", "delivery date"], 2),
            supplier: FieldRule::new(&["name", "supplier", "vendor"], 3),
            quantity: FieldRule::new(&["qty", "quantity"], 4),
            unit: FieldRule::new(&["unit"], 5),
        }
    }
}

impl FieldRules {
    pub fn rule(&self, field: Field) -> &FieldRule {
        match field {
            Field::Product => &self.product,
            Field::Price => &self.price,
            Field::Date => &self.date,
            Field::Supplier => &self.supplier,
            Field::Quantity => &self.quantity,
            Field::Unit => &self.unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderRules {
    /// Header row offsets tried in order; the first whose names contain a
    /// token wins.
    pub candidate_offsets: Vec<usize>,
    pub fallback_offset: usize,
    pub tokens: Vec<String>,
}

impl Default for HeaderRules {
    fn default() -> Self {
        Self {
            candidate_offsets: vec![0, 3, 4, 5, 6],
            fallback_offset: 4,
            tokens: ["description", "price", "date", "qty", "unit", "po#"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub header: HeaderRules,
    pub fields: FieldRules,
    pub currency_symbol: String,
    pub max_input_bytes: u64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            header: HeaderRules::default(),
            fields: FieldRules::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl NormalizerConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self, IngestError> {
        let config: NormalizerConfig =
            serde_yaml::from_str(input).map_err(|err| IngestError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening config file {path:?}"))?;
        let config = Self::from_yaml_str(&raw)
            .with_context(|| format!("Parsing config file {path:?}"))?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.header.candidate_offsets.is_empty() {
            return Err(IngestError::Config(
                "header.candidate_offsets must list at least one offset".to_string(),
            ));
        }
        if self.header.tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(IngestError::Config(
                "header.tokens cannot contain empty tokens".to_string(),
            ));
        }
        for field in Field::ALL {
            let rule = self.fields.rule(field);
            if rule.aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(IngestError::Config(format!(
                    "fields.{field}.aliases cannot contain empty aliases"
                )));
            }
        }
        Ok(())
    }
}
