use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{OrderDataset, OrderRecord};

// ---------------------------------------------------------------------------
// FilterSpec – the user's current selection
// ---------------------------------------------------------------------------

/// Date range plus allowed products and cities.
///
/// An empty `products` or `cities` set selects nothing. "No filter" is the
/// full universe, see [`FilterSpec::universe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Inclusive lower bound, compared on calendar date only.
    pub date_from: NaiveDate,
    /// Inclusive upper bound, compared on calendar date only.
    pub date_to: NaiveDate,
    pub products: BTreeSet<String>,
    pub cities: BTreeSet<String>,
}

impl FilterSpec {
    /// A spec selecting everything present in the dataset.
    pub fn universe(dataset: &OrderDataset) -> Self {
        let (date_from, date_to) = dataset
            .date_bounds
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        FilterSpec {
            date_from,
            date_to,
            products: dataset.products.clone(),
            cities: dataset.cities.clone(),
        }
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        let date = record.date();
        self.date_from <= date
            && date <= self.date_to
            && self.products.contains(&record.product)
            && self.cities.contains(&record.city)
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Return indices of records passing `spec`, in source order.
///
/// A reversed date range (`date_from > date_to`) matches nothing; the bounds
/// are never swapped.
pub fn filtered_indices(records: &[OrderRecord], spec: &FilterSpec) -> Vec<usize> {
    if spec.date_from > spec.date_to || spec.products.is_empty() || spec.cities.is_empty() {
        debug!("filter selects nothing: {spec:?}");
        return Vec::new();
    }

    let kept: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, rec)| spec.matches(rec))
        .map(|(i, _)| i)
        .collect();

    debug!("filter kept {} of {} orders", kept.len(), records.len());
    kept
}

/// Return the records passing `spec`, borrowed from `records`, in source order.
pub fn apply<'a>(records: &'a [OrderRecord], spec: &FilterSpec) -> Vec<&'a OrderRecord> {
    filtered_indices(records, spec)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}

/// Apply `spec`, or the dataset's universe when no spec is given.
pub fn apply_or_universe<'a>(
    dataset: &'a OrderDataset,
    spec: Option<&FilterSpec>,
) -> Vec<&'a OrderRecord> {
    match spec {
        Some(spec) => apply(&dataset.records, spec),
        None => apply(&dataset.records, &FilterSpec::universe(dataset)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn order(id: &str, date: NaiveDate, hour: u32, product: &str, city: &str) -> OrderRecord {
        OrderRecord::new(
            id,
            date.and_hms_opt(hour, 0, 0).unwrap(),
            "cust",
            product,
            city,
            1,
            Decimal::ONE,
            "Card",
        )
    }

    fn dataset() -> OrderDataset {
        OrderDataset::from_records(vec![
            order("1", day(2024, 1, 5), 0, "A", "X"),
            order("2", day(2024, 1, 31), 23, "B", "Y"),
            order("3", day(2024, 2, 1), 0, "A", "Y"),
            order("4", day(2024, 1, 5), 18, "C", "X"),
        ])
    }

    fn ids(recs: &[&OrderRecord]) -> Vec<String> {
        recs.iter().map(|r| r.order_id.clone()).collect()
    }

    #[test]
    fn universe_keeps_everything() {
        let ds = dataset();
        let spec = FilterSpec::universe(&ds);
        assert_eq!(spec.date_from, day(2024, 1, 5));
        assert_eq!(spec.date_to, day(2024, 2, 1));
        assert_eq!(ids(&apply(&ds.records, &spec)), ["1", "2", "3", "4"]);
        assert_eq!(apply_or_universe(&ds, None).len(), 4);
    }

    #[test]
    fn date_bounds_are_inclusive_and_ignore_time() {
        let ds = dataset();
        let mut spec = FilterSpec::universe(&ds);
        spec.date_from = day(2024, 1, 5);
        spec.date_to = day(2024, 1, 31);
        assert_eq!(ids(&apply(&ds.records, &spec)), ["1", "2", "4"]);

        spec.date_to = day(2024, 1, 5);
        assert_eq!(ids(&apply(&ds.records, &spec)), ["1", "4"]);
    }

    #[test]
    fn reversed_range_selects_nothing() {
        let ds = dataset();
        let mut spec = FilterSpec::universe(&ds);
        spec.date_from = day(2024, 2, 1);
        spec.date_to = day(2024, 1, 5);
        assert!(filtered_indices(&ds.records, &spec).is_empty());
    }

    #[test]
    fn empty_sets_select_nothing() {
        let ds = dataset();
        let mut spec = FilterSpec::universe(&ds);
        spec.products.clear();
        assert!(apply(&ds.records, &spec).is_empty());

        let mut spec = FilterSpec::universe(&ds);
        spec.cities.clear();
        assert!(apply(&ds.records, &spec).is_empty());
    }

    #[test]
    fn product_and_city_sets_combine() {
        let ds = dataset();
        let mut spec = FilterSpec::universe(&ds);
        spec.products = ["A".to_string()].into();
        spec.cities = ["Y".to_string()].into();
        assert_eq!(filtered_indices(&ds.records, &spec), [2]);
    }

    #[test]
    fn unknown_values_in_spec_are_harmless() {
        let ds = dataset();
        let mut spec = FilterSpec::universe(&ds);
        spec.products.insert("Z".to_string());
        assert_eq!(apply(&ds.records, &spec).len(), 4);
    }

    #[test]
    fn empty_dataset_universe_spans_all_dates() {
        let ds = OrderDataset::default();
        let spec = FilterSpec::universe(&ds);
        assert_eq!(spec.date_from, NaiveDate::MIN);
        assert_eq!(spec.date_to, NaiveDate::MAX);
        assert!(apply(&ds.records, &spec).is_empty());
    }
}
