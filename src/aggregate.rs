use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::normalize::CanonicalRecord;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestPriceEntry<'a> {
    pub record: &'a CanonicalRecord,
    /// Every record of this product/supplier pair lacked a usable date.
    pub date_invalid: bool,
}

type PairKey<'a> = (&'a str, Option<&'a str>);

/// Most recent record per (product, supplier) pair.
///
/// Pairs are compared by exact string equality; a missing supplier forms
/// its own pair. Ties on date, including a group where every date is
/// missing, keep the record that came first in the input. Entries are
/// returned in order of each pair's first appearance.
pub fn latest_prices(records: &[CanonicalRecord]) -> Vec<LatestPriceEntry<'_>> {
    let mut positions: HashMap<PairKey<'_>, usize> = HashMap::new();
    let mut latest: Vec<&CanonicalRecord> = Vec::new();

    for record in records {
        let key = (record.product.as_str(), record.supplier.as_deref());
        match positions.get(&key) {
            Some(&slot) => {
                if record.order_date > latest[slot].order_date {
                    latest[slot] = record;
                }
            }
            None => {
                positions.insert(key, latest.len());
                latest.push(record);
            }
        }
    }

    latest
        .into_iter()
        .map(|record| LatestPriceEntry {
            record,
            date_invalid: record.order_date.is_none(),
        })
        .collect()
}

/// All records for `product` (exact match), newest first. Records without a
/// date come last in their original order.
pub fn history<'a>(records: &'a [CanonicalRecord], product: &str) -> Vec<&'a CanonicalRecord> {
    let mut rows = records
        .iter()
        .filter(|record| record.product == product)
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| b.order_date.cmp(&a.order_date));
    rows
}

pub fn distinct_products(records: &[CanonicalRecord]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record.product.as_str())
        .sorted()
        .dedup()
        .collect()
}

pub fn distinct_suppliers(records: &[CanonicalRecord]) -> Vec<&str> {
    records
        .iter()
        .filter_map(|record| record.supplier.as_deref())
        .sorted()
        .dedup()
        .collect()
}
