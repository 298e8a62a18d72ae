use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sales_dashboard::data::aggregate::{self, Dashboard};
use sales_dashboard::data::filter::{apply, filtered_indices};
use sales_dashboard::data::loader::load_csv_reader;
use sales_dashboard::{DashboardError, FilterSpec, OrderDataset, Session};

const ORDERS: &str = "\
order_id,order_date,customer_name,product,city,quantity,price,payment_method
1,2024-01-05 10:15:00,Ann,A,X,2,10,Card
2,2024-02-10,Bob,B,Y,1,5,Cash
3,2024-01-05 23:59:59,Cid,B,X,3,2.50,Card
4,2024-01-20,Ann,A,Y,1,99.99,PayPal
5,2024-03-01,Dan,C,Z,4,0.10,Card
6,2024-02-28,Bob,A,X,2,10,Cash
";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dataset() -> OrderDataset {
    load_csv_reader(ORDERS.as_bytes()).expect("load orders")
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// A handful of selections covering narrow, wide, empty and reversed cases.
fn specs(ds: &OrderDataset) -> Vec<FilterSpec> {
    let universe = FilterSpec::universe(ds);
    let mut out = vec![universe.clone()];

    let mut jan = universe.clone();
    jan.date_from = day(2024, 1, 1);
    jan.date_to = day(2024, 1, 31);
    out.push(jan);

    let mut only_a = universe.clone();
    only_a.products = set(&["A"]);
    out.push(only_a);

    let mut x_and_z = universe.clone();
    x_and_z.cities = set(&["X", "Z"]);
    out.push(x_and_z);

    let mut reversed = universe.clone();
    reversed.date_from = day(2024, 3, 1);
    reversed.date_to = day(2024, 1, 1);
    out.push(reversed);

    let mut none = universe;
    none.products.clear();
    out.push(none);

    out
}

#[test]
fn monthly_revenue_sums_to_total() {
    let ds = dataset();
    for spec in specs(&ds) {
        let sel = apply(&ds.records, &spec);
        let monthly: Decimal = aggregate::revenue_by_month(&sel)
            .iter()
            .map(|m| m.revenue)
            .sum();
        assert_eq!(monthly, aggregate::total_revenue(&sel), "{spec:?}");
    }
}

#[test]
fn order_count_matches_scatter_points() {
    let ds = dataset();
    for spec in specs(&ds) {
        let sel = apply(&ds.records, &spec);
        assert_eq!(
            aggregate::order_count(&sel),
            aggregate::quantity_price_pairs(&sel).len()
        );
    }
}

#[test]
fn filtering_is_idempotent_and_narrowing() {
    let ds = dataset();
    for spec in specs(&ds) {
        let first = filtered_indices(&ds.records, &spec);
        let second = filtered_indices(&ds.records, &spec);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0] < w[1]), "order preserved");
        assert!(first.iter().all(|&i| i < ds.len()));
        assert!(first.len() <= ds.len());
    }
}

#[test]
fn single_day_range_selects_exactly_that_day() {
    let ds = dataset();
    let mut spec = FilterSpec::universe(&ds);
    spec.date_from = day(2024, 1, 5);
    spec.date_to = day(2024, 1, 5);

    let sel = apply(&ds.records, &spec);
    let ids: Vec<&str> = sel.iter().map(|r| r.order_id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
    assert!(sel.iter().all(|r| r.date() == day(2024, 1, 5)));
}

#[test]
fn reversed_range_empties_every_view() {
    let ds = dataset();
    let mut spec = FilterSpec::universe(&ds);
    spec.date_from = day(2024, 2, 1);
    spec.date_to = day(2024, 1, 31);

    let dash = Dashboard::compute(&apply(&ds.records, &spec));
    assert_eq!(dash, Dashboard::compute(&[]));
    assert_eq!(dash.kpis.order_count, 0);
    assert_eq!(dash.kpis.total_revenue, Decimal::ZERO);
    assert!(dash.revenue_by_city.is_empty());
}

#[test]
fn two_record_scenario() {
    let text = "\
order_id,order_date,customer_name,product,city,quantity,price,payment_method
1,2024-01-05,c1,A,X,2,10,Card
2,2024-02-10,c2,B,Y,1,5,Cash
";
    let ds = load_csv_reader(text.as_bytes()).unwrap();
    let spec = FilterSpec {
        date_from: day(2024, 1, 1),
        date_to: day(2024, 1, 31),
        products: set(&["A", "B"]),
        cities: set(&["X", "Y"]),
    };

    let sel = apply(&ds.records, &spec);
    assert_eq!(sel.len(), 1);
    assert_eq!(sel[0].order_id, "1");
    assert_eq!(aggregate::total_revenue(&sel), Decimal::new(20, 0));
    assert_eq!(aggregate::order_count(&sel), 1);

    let months: Vec<(String, Decimal)> = aggregate::revenue_by_month(&sel)
        .into_iter()
        .map(|m| (m.month, m.revenue))
        .collect();
    assert_eq!(months, vec![("2024-01".to_string(), Decimal::new(20, 0))]);
}

#[test]
fn unparseable_price_fails_the_load() {
    let text = "\
order_id,order_date,customer_name,product,city,quantity,price,payment_method
1,2024-01-05,c1,A,X,2,10,Card
2,2024-02-10,c2,B,Y,1,N/A,Cash
";
    match load_csv_reader(text.as_bytes()) {
        Err(DashboardError::ValueParse { row, column, value, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(column, "price");
            assert_eq!(value, "N/A");
        }
        other => panic!("expected ValueParse, got {other:?}"),
    }
}

#[test]
fn empty_product_set_empties_grouped_views() {
    let ds = dataset();
    let mut spec = FilterSpec::universe(&ds);
    spec.products = BTreeSet::new();

    let dash = Dashboard::compute(&apply(&ds.records, &spec));
    assert_eq!(dash.kpis.order_count, 0);
    assert!(dash.payment_methods.is_empty());
    assert!(dash.revenue_by_month.is_empty());
    assert!(dash.quantity_by_month_product.is_empty());
    assert!(dash.orders_by_city.is_empty());
    assert!(dash.revenue_by_city.is_empty());
}

#[test]
fn full_dashboard_over_universe() {
    let ds = dataset();
    let dash = Dashboard::compute(&apply(&ds.records, &FilterSpec::universe(&ds)));

    // 20 + 5 + 7.50 + 99.99 + 0.40 + 20
    assert_eq!(dash.kpis.total_revenue, Decimal::new(15289, 2));
    assert_eq!(dash.kpis.customer_count, 4);
    assert_eq!(dash.kpis.product_count, 3);
    assert_eq!(dash.payment_methods["Card"].count, 3);

    let cities: Vec<(&str, usize)> = dash
        .orders_by_city
        .iter()
        .map(|c| (c.city.as_str(), c.count))
        .collect();
    assert_eq!(cities, [("X", 3), ("Y", 2), ("Z", 1)]);

    let top = &dash.revenue_by_city[0];
    assert_eq!((top.city.as_str(), top.revenue), ("Y", Decimal::new(10499, 2)));

    let months: Vec<&str> = dash.revenue_by_month.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(months, ["2024-01", "2024-02", "2024-03"]);
}

#[test]
fn concurrent_sessions_read_one_snapshot() {
    let data = Arc::new(dataset());

    std::thread::scope(|scope| {
        for product in ["A", "B", "C"] {
            let data = Arc::clone(&data);
            scope.spawn(move || {
                let mut session = Session::new(data);
                session.select_no_products();
                session.toggle_product(product);
                let dash = session.dashboard();
                assert!(dash
                    .quantity_price
                    .iter()
                    .all(|p| p.product == product));
            });
        }
    });

    assert_eq!(Session::new(data).dashboard().kpis.order_count, 6);
}

#[test]
fn dashboard_serialises_for_the_presentation_layer() {
    let ds = dataset();
    let dash = Session::new(Arc::new(ds)).dashboard();
    let json = serde_json::to_value(&dash).unwrap();

    assert_eq!(json["kpis"]["order_count"], 6);
    assert!(json["revenue_by_month"].as_array().unwrap().len() == 3);
    assert!(json["payment_methods"]["Cash"]["share"].as_f64().unwrap() > 0.3);
}
