use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::data::aggregate::Dashboard;

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Whole-dollar amount with thousands separators, e.g. `$12,346`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", group_thousands(&digits))
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A `[0, 1]` share as a percentage with one decimal, e.g. `42.5%`.
pub fn format_share(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

/// Every view as plain text. Empty selections render a "no data" line per
/// section instead of empty tables.
pub struct TextReport<'a>(pub &'a Dashboard);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dash = self.0;
        let k = &dash.kpis;

        writeln!(f, "Total revenue : {}", format_currency(k.total_revenue))?;
        writeln!(f, "Orders        : {}", k.order_count)?;
        writeln!(f, "Customers     : {}", k.customer_count)?;
        writeln!(f, "Products      : {}", k.product_count)?;

        section(f, "Payment methods", dash.payment_methods.is_empty())?;
        for (method, s) in &dash.payment_methods {
            writeln!(f, "  {method:<20} {:>6} {:>7}", s.count, format_share(s.share))?;
        }

        section(f, "Revenue by month", dash.revenue_by_month.is_empty())?;
        for row in &dash.revenue_by_month {
            writeln!(f, "  {:<20} {:>14}", row.month, format_currency(row.revenue))?;
        }

        section(
            f,
            "Quantity by month and product",
            dash.quantity_by_month_product.is_empty(),
        )?;
        for row in &dash.quantity_by_month_product {
            writeln!(f, "  {:<8} {:<20} {:>8}", row.month, row.product, row.quantity)?;
        }

        section(f, "Orders by city", dash.orders_by_city.is_empty())?;
        for row in &dash.orders_by_city {
            writeln!(f, "  {:<20} {:>6}", row.city, row.count)?;
        }

        section(f, "Revenue by city", dash.revenue_by_city.is_empty())?;
        for row in &dash.revenue_by_city {
            writeln!(f, "  {:<20} {:>14}", row.city, format_currency(row.revenue))?;
        }
        Ok(())
    }
}

fn section(f: &mut fmt::Formatter<'_>, title: &str, empty: bool) -> fmt::Result {
    writeln!(f, "\n{title}")?;
    if empty {
        writeln!(f, "  (no data)")?;
    }
    Ok(())
}

/// Render every view as plain text.
pub fn render_text(dash: &Dashboard) -> String {
    TextReport(dash).to_string()
}
