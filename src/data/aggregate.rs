//! Derived views over a filtered selection.
//!
//! Every function is pure and takes the selection as borrowed records, so the
//! same selection can feed every chart without copying.
//!
//! Sums saturate instead of overflowing. Loaded datasets never reach the bound
//! because the loader rejects tables whose totals do not fit.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Serialize;

use super::model::OrderRecord;

// ---------------------------------------------------------------------------
// Scalar metrics
// ---------------------------------------------------------------------------

pub fn total_revenue(records: &[&OrderRecord]) -> Decimal {
    records
        .iter()
        .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.revenue))
}

pub fn order_count(records: &[&OrderRecord]) -> usize {
    records.len()
}

pub fn customer_count(records: &[&OrderRecord]) -> usize {
    records
        .iter()
        .map(|r| r.customer_name.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn product_count(records: &[&OrderRecord]) -> usize {
    records
        .iter()
        .map(|r| r.product.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// The four headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: Decimal,
    pub order_count: usize,
    pub customer_count: usize,
    pub product_count: usize,
}

impl Kpis {
    pub fn compute(records: &[&OrderRecord]) -> Self {
        Kpis {
            total_revenue: total_revenue(records),
            order_count: order_count(records),
            customer_count: customer_count(records),
            product_count: product_count(records),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouped views
// ---------------------------------------------------------------------------

/// Order count and share of one payment method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodShare {
    pub count: usize,
    /// `count / order_count`, in `[0, 1]`.
    pub share: f64,
}

/// Orders per payment method, for the donut chart. Keys are ordered by name.
pub fn payment_method_breakdown(records: &[&OrderRecord]) -> BTreeMap<String, MethodShare> {
    let counts = count_by(records, |r| r.payment_method.as_str());
    let total = records.len() as f64;
    counts
        .into_iter()
        .map(|(method, count)| {
            (
                method.to_string(),
                MethodShare {
                    count,
                    share: count as f64 / total,
                },
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRevenue {
    pub month: String,
    pub revenue: Decimal,
}

/// Revenue per `YYYY-MM` bucket, ascending by month.
pub fn revenue_by_month(records: &[&OrderRecord]) -> Vec<MonthRevenue> {
    sum_by(records, |r| r.month_year.as_str(), |r| r.revenue)
        .into_iter()
        .map(|(month, revenue)| MonthRevenue {
            month: month.to_string(),
            revenue,
        })
        .collect()
}

/// One point of the quantity/price scatter, with its hover fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantityPricePoint {
    pub quantity: u64,
    pub price: Decimal,
    pub product: String,
    pub order_id: String,
    pub customer_name: String,
    pub city: String,
}

/// One point per record, in selection order.
pub fn quantity_price_pairs(records: &[&OrderRecord]) -> Vec<QuantityPricePoint> {
    records
        .iter()
        .map(|r| QuantityPricePoint {
            quantity: r.quantity,
            price: r.price,
            product: r.product.clone(),
            order_id: r.order_id.clone(),
            customer_name: r.customer_name.clone(),
            city: r.city.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthProductQuantity {
    pub month: String,
    pub product: String,
    pub quantity: u64,
}

/// Units sold per (month, product), ascending by month then product.
pub fn quantity_by_month_product(records: &[&OrderRecord]) -> Vec<MonthProductQuantity> {
    let mut groups: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for r in records {
        let total = groups
            .entry((r.month_year.as_str(), r.product.as_str()))
            .or_default();
        *total = total.saturating_add(r.quantity);
    }
    groups
        .into_iter()
        .map(|((month, product), quantity)| MonthProductQuantity {
            month: month.to_string(),
            product: product.to_string(),
            quantity,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

/// Orders per city, largest first; ties by city name.
pub fn orders_by_city(records: &[&OrderRecord]) -> Vec<CityCount> {
    let mut rows: Vec<CityCount> = count_by(records, |r| r.city.as_str())
        .into_iter()
        .map(|(city, count)| CityCount {
            city: city.to_string(),
            count,
        })
        .collect();
    // Stable sort over name-ordered input keeps ties alphabetical.
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityRevenue {
    pub city: String,
    pub revenue: Decimal,
}

/// Revenue per city, largest first; ties by city name.
pub fn revenue_by_city(records: &[&OrderRecord]) -> Vec<CityRevenue> {
    let mut rows: Vec<CityRevenue> = sum_by(records, |r| r.city.as_str(), |r| r.revenue)
        .into_iter()
        .map(|(city, revenue)| CityRevenue {
            city: city.to_string(),
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

// -- grouping helpers --

fn count_by<'a>(
    records: &[&'a OrderRecord],
    key: impl Fn(&'a OrderRecord) -> &'a str,
) -> BTreeMap<&'a str, usize> {
    let mut groups = BTreeMap::new();
    for r in records {
        *groups.entry(key(*r)).or_default() += 1;
    }
    groups
}

fn sum_by<'a>(
    records: &[&'a OrderRecord],
    key: impl Fn(&'a OrderRecord) -> &'a str,
    measure: impl Fn(&OrderRecord) -> Decimal,
) -> BTreeMap<&'a str, Decimal> {
    let mut groups: BTreeMap<&str, Decimal> = BTreeMap::new();
    for r in records {
        let total = groups.entry(key(*r)).or_default();
        *total = total.saturating_add(measure(*r));
    }
    groups
}

// ---------------------------------------------------------------------------
// Dashboard – every view for one selection
// ---------------------------------------------------------------------------

/// All derived views for one filtered selection, ready for a presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub kpis: Kpis,
    pub payment_methods: BTreeMap<String, MethodShare>,
    pub revenue_by_month: Vec<MonthRevenue>,
    pub quantity_price: Vec<QuantityPricePoint>,
    pub quantity_by_month_product: Vec<MonthProductQuantity>,
    pub orders_by_city: Vec<CityCount>,
    pub revenue_by_city: Vec<CityRevenue>,
}

impl Dashboard {
    pub fn compute(records: &[&OrderRecord]) -> Self {
        Dashboard {
            kpis: Kpis::compute(records),
            payment_methods: payment_method_breakdown(records),
            revenue_by_month: revenue_by_month(records),
            quantity_price: quantity_price_pairs(records),
            quantity_by_month_product: quantity_by_month_product(records),
            orders_by_city: orders_by_city(records),
            revenue_by_city: revenue_by_city(records),
        }
    }

    /// Whether the selection was empty ("no data" state).
    pub fn is_empty(&self) -> bool {
        self.kpis.order_count == 0
    }
}
