use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;

// ---------------------------------------------------------------------------
// OrderRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single order (one row of the source table), with derived columns.
///
/// Records are never mutated after the loader builds them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    /// Opaque identifier, kept as text.
    pub order_id: String,
    pub order_date: NaiveDateTime,
    pub customer_name: String,
    pub product: String,
    pub city: String,
    pub quantity: u64,
    /// Unit price.
    pub price: Decimal,
    pub payment_method: String,
    /// `quantity * price`.
    pub revenue: Decimal,
    /// Calendar month bucket, `YYYY-MM`.
    pub month_year: String,
}

impl OrderRecord {
    /// Build a record from its raw fields, computing `revenue` and `month_year`.
    ///
    /// Revenue saturates at `Decimal::MAX`; the loader rejects such rows first.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        order_id: impl Into<String>,
        order_date: NaiveDateTime,
        customer_name: impl Into<String>,
        product: impl Into<String>,
        city: impl Into<String>,
        quantity: u64,
        price: Decimal,
        payment_method: impl Into<String>,
    ) -> Self {
        OrderRecord {
            order_id: order_id.into(),
            order_date,
            customer_name: customer_name.into(),
            product: product.into(),
            city: city.into(),
            quantity,
            price,
            payment_method: payment_method.into(),
            revenue: Decimal::from(quantity).saturating_mul(price),
            month_year: month_bucket(order_date.date()),
        }
    }

    /// Calendar date of the order, time-of-day dropped.
    pub fn date(&self) -> NaiveDate {
        self.order_date.date()
    }
}

/// Format the month bucket of a date as a sortable `YYYY-MM` string.
pub fn month_bucket(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ---------------------------------------------------------------------------
// OrderDataset – the complete loaded snapshot
// ---------------------------------------------------------------------------

/// The full loaded dataset with pre-computed value universes.
#[derive(Debug, Clone, Default)]
pub struct OrderDataset {
    /// All orders, in source order.
    pub records: Vec<OrderRecord>,
    /// Distinct products, sorted.
    pub products: BTreeSet<String>,
    /// Distinct cities, sorted.
    pub cities: BTreeSet<String>,
    /// Distinct payment methods, sorted.
    pub payment_methods: BTreeSet<String>,
    /// Earliest and latest order date, `None` when empty.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl OrderDataset {
    /// Build the value universes from the loaded records.
    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        let mut products = BTreeSet::new();
        let mut cities = BTreeSet::new();
        let mut payment_methods = BTreeSet::new();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            products.insert(rec.product.clone());
            cities.insert(rec.city.clone());
            payment_methods.insert(rec.payment_method.clone());

            let d = rec.date();
            date_bounds = Some(match date_bounds {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }

        OrderDataset {
            records,
            products,
            cities,
            payment_methods,
            date_bounds,
        }
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn derived_columns_are_computed() {
        let rec = OrderRecord::new(
            "7",
            at(2024, 3, 9, 15),
            "Alice",
            "Laptop",
            "Paris",
            3,
            Decimal::new(1250, 2),
            "Card",
        );
        assert_eq!(rec.revenue, Decimal::new(3750, 2));
        assert_eq!(rec.month_year, "2024-03");
        assert_eq!(rec.date(), NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn month_bucket_pads_single_digits() {
        let d = NaiveDate::from_ymd_opt(987, 1, 2).unwrap();
        assert_eq!(month_bucket(d), "0987-01");
    }

    #[test]
    fn dataset_collects_universes_and_bounds() {
        let records = vec![
            OrderRecord::new("1", at(2024, 2, 1, 0), "A", "P2", "Lyon", 1, Decimal::ONE, "Cash"),
            OrderRecord::new("2", at(2023, 12, 31, 23), "B", "P1", "Nice", 1, Decimal::ONE, "Card"),
            OrderRecord::new("3", at(2024, 1, 15, 8), "A", "P1", "Lyon", 1, Decimal::ONE, "Card"),
        ];
        let ds = OrderDataset::from_records(records);

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.products.iter().collect::<Vec<_>>(), ["P1", "P2"]);
        assert_eq!(ds.cities.iter().collect::<Vec<_>>(), ["Lyon", "Nice"]);
        assert_eq!(ds.payment_methods.len(), 2);
        assert_eq!(
            ds.date_bounds,
            Some((
                NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
            ))
        );
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = OrderDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert!(ds.date_bounds.is_none());
    }
}
