use log::debug;
use serde::Serialize;

use crate::config::{Field, FieldRule, FieldRules};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingSource {
    Alias { alias: String },
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnBinding {
    pub field: Field,
    pub index: usize,
    /// Header name at `index`, absent when a positional fallback points past
    /// the last column.
    pub header: Option<String>,
    pub source: BindingSource,
}

impl ColumnBinding {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, BindingSource::Fallback)
    }

    pub fn label(&self) -> String {
        match &self.header {
            Some(name) => name.clone(),
            None => format!("#{} (missing)", self.index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub product: ColumnBinding,
    pub price: ColumnBinding,
    pub date: ColumnBinding,
    pub supplier: ColumnBinding,
    pub quantity: ColumnBinding,
    pub unit: ColumnBinding,
}

impl ColumnMapping {
    pub fn binding(&self, field: Field) -> &ColumnBinding {
        match field {
            Field::Product => &self.product,
            Field::Price => &self.price,
            Field::Date => &self.date,
            Field::Supplier => &self.supplier,
            Field::Quantity => &self.quantity,
            Field::Unit => &self.unit,
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = &ColumnBinding> {
        Field::ALL.into_iter().map(|field| self.binding(field))
    }

    pub fn fallbacks(&self) -> impl Iterator<Item = &ColumnBinding> {
        self.bindings().filter(|binding| binding.is_fallback())
    }
}

/// Resolves every canonical field to a column. Always succeeds; fields no
/// alias matches fall back to their configured position.
pub fn map_columns(columns: &[String], rules: &FieldRules) -> ColumnMapping {
    let bind = |field: Field| bind_field(field, rules.rule(field), columns);
    ColumnMapping {
        product: bind(Field::Product),
        price: bind(Field::Price),
        date: bind(Field::Date),
        supplier: bind(Field::Supplier),
        quantity: bind(Field::Quantity),
        unit: bind(Field::Unit),
    }
}

fn bind_field(field: Field, rule: &FieldRule, columns: &[String]) -> ColumnBinding {
    let lowered = columns.iter().map(|c| c.to_lowercase()).collect::<Vec<_>>();
    for alias in &rule.aliases {
        let needle = alias.to_lowercase();
        if let Some(index) = lowered.iter().position(|name| name.contains(&needle)) {
            debug!("{field} -> '{}' (alias '{alias}')", columns[index]);
            return ColumnBinding {
                field,
                index,
                header: Some(columns[index].clone()),
                source: BindingSource::Alias {
                    alias: alias.clone(),
                },
            };
        }
    }
    let index = rule.fallback_index;
    debug!("{field} -> column #{index} (positional fallback)");
    ColumnBinding {
        field,
        index,
        header: columns.get(index).cloned(),
        source: BindingSource::Fallback,
    }
}
