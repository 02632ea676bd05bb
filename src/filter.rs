use serde::Serialize;

use crate::aggregate::LatestPriceEntry;

/// Selection applied to the latest-price view. `supplier: None` means all
/// suppliers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceFilter {
    pub supplier: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    pub shown: usize,
    pub total: usize,
}

impl FilterSummary {
    pub fn is_filtered(&self) -> bool {
        self.shown < self.total
    }
}

impl PriceFilter {
    pub fn new(supplier: Option<&str>, search: Option<&str>) -> Self {
        Self {
            supplier: supplier.map(str::to_string),
            search: search.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    pub fn matches(&self, entry: &LatestPriceEntry<'_>) -> bool {
        if let Some(supplier) = &self.supplier
            && entry.record.supplier.as_deref() != Some(supplier.as_str())
        {
            return false;
        }
        match &self.search {
            Some(term) => contains_ignore_case(&entry.record.product, term),
            None => true,
        }
    }

    /// Keeps matching entries, newest first (undated last, otherwise stable).
    pub fn apply<'a>(
        &self,
        entries: &[LatestPriceEntry<'a>],
    ) -> (Vec<LatestPriceEntry<'a>>, FilterSummary) {
        let mut shown = entries
            .iter()
            .filter(|entry| self.matches(entry))
            .copied()
            .collect::<Vec<_>>();
        shown.sort_by(|a, b| b.record.order_date.cmp(&a.record.order_date));
        let summary = FilterSummary {
            shown: shown.len(),
            total: entries.len(),
        };
        (shown, summary)
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::CanonicalRecord;

    fn record(product: &str, supplier: Option<&str>) -> CanonicalRecord {
        CanonicalRecord {
            product: product.to_string(),
            supplier: supplier.map(str::to_string),
            unit_price: None,
            quantity: None,
            unit: None,
            order_date: None,
            raw_date: String::new(),
            source_row: 0,
        }
    }

    fn entry(record: &CanonicalRecord) -> LatestPriceEntry<'_> {
        LatestPriceEntry {
            record,
            date_invalid: record.order_date.is_none(),
        }
    }

    #[test]
    fn empty_search_matches_everything() {
        let filter = PriceFilter::new(None, Some(""));
        assert_eq!(filter.search, None);
        let r = record("Widget", None);
        assert!(filter.matches(&entry(&r)));
    }

    #[test]
    fn search_term_is_matched_as_typed() {
        let filter = PriceFilter::new(None, Some(" A"));
        let spaced = record("Widget A", None);
        let joined = record("Anchor", None);
        assert!(filter.matches(&entry(&spaced)));
        assert!(!filter.matches(&entry(&joined)));
    }

    #[test]
    fn supplier_filter_excludes_missing_suppliers() {
        let filter = PriceFilter::new(Some("Acme"), None);
        let missing = record("Widget", None);
        let other = record("Widget", Some("Acme Corp"));
        let exact = record("Widget", Some("Acme"));
        assert!(!filter.matches(&entry(&missing)));
        assert!(!filter.matches(&entry(&other)));
        assert!(filter.matches(&entry(&exact)));
    }

    #[test]
    fn search_is_unicode_case_insensitive() {
        assert!(contains_ignore_case("CAFÉ Beans", "café"));
        assert!(!contains_ignore_case("Tea", "coffee"));
    }
}
