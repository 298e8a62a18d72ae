use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value as JsonValue};

use super::model::{OrderDataset, OrderRecord};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Required columns
// ---------------------------------------------------------------------------

/// The source columns every input must carry. Extra columns are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    OrderId,
    OrderDate,
    CustomerName,
    Product,
    City,
    Quantity,
    Price,
    PaymentMethod,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::OrderId,
        Column::OrderDate,
        Column::CustomerName,
        Column::Product,
        Column::City,
        Column::Quantity,
        Column::Price,
        Column::PaymentMethod,
    ];

    /// Header name in the source table.
    pub fn name(self) -> &'static str {
        match self {
            Column::OrderId => "order_id",
            Column::OrderDate => "order_date",
            Column::CustomerName => "customer_name",
            Column::Product => "product",
            Column::City => "city",
            Column::Quantity => "quantity",
            Column::Price => "price",
            Column::PaymentMethod => "payment_method",
        }
    }
}

fn missing_column(column: Column) -> DashboardError {
    DashboardError::DataFormat {
        column: column.name().to_string(),
    }
}

/// Raw text of the required cells of one row, in [`Column::ALL`] order.
/// `None` means the cell is absent or null.
type RawCells<'a> = [Option<&'a str>; 8];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an order table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one order per line (primary format)
/// * `.json`    – `[{ "order_id": ..., "order_date": ..., ... }, ...]`
/// * `.parquet` – one column per field, any Arrow type castable to text
///
/// Loading is all-or-nothing: the first bad row fails the whole load.
pub fn load_file(path: &Path) -> Result<OrderDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|e| DashboardError::io(path, e))?;
            load_csv_reader(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
            load_json_str(&text)?
        }
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DashboardError::UnsupportedFormat(other.to_string())),
    };

    info!("loaded {} orders from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Load orders from any CSV source with a header row.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<OrderDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let positions = resolve_columns(|name| headers.iter().position(|h| h == name))?;

    let mut orders = OrderAccumulator::default();
    for result in reader.records() {
        let record = result?;
        let cells: RawCells<'_> = positions.map(|pos| record.get(pos));
        orders.push(&cells)?;
    }

    debug!("parsed {} CSV rows", orders.records.len());
    Ok(orders.finish())
}

/// Map every required column to its position, or fail on the first missing one.
fn resolve_columns(mut lookup: impl FnMut(&str) -> Option<usize>) -> Result<[usize; 8]> {
    let mut positions = [0usize; 8];
    for (slot, column) in positions.iter_mut().zip(Column::ALL) {
        *slot = lookup(column.name()).ok_or_else(|| missing_column(column))?;
    }
    Ok(positions)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Load orders from a records-oriented JSON array
/// (the layout of `df.to_json(orient='records')`).
///
/// A numeric `order_date` is read as epoch milliseconds.
pub fn load_json_str(text: &str) -> Result<OrderDataset> {
    let rows: Vec<Map<String, JsonValue>> = serde_json::from_str(text)?;

    if !rows.is_empty() {
        for column in Column::ALL {
            if !rows.iter().any(|obj| obj.contains_key(column.name())) {
                return Err(missing_column(column));
            }
        }
    }

    let mut orders = OrderAccumulator::default();
    for obj in &rows {
        let texts: [Option<String>; 8] =
            Column::ALL.map(|column| obj.get(column.name()).and_then(|v| json_cell(column, v)));
        let cells: RawCells<'_> = std::array::from_fn(|i| texts[i].as_deref());
        orders.push(&cells)?;
    }

    Ok(orders.finish())
}

fn json_cell(column: Column, val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) if column == Column::OrderDate => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64));
            let parsed = millis
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc().format("%Y-%m-%dT%H:%M:%S%.f").to_string());
            Some(parsed.unwrap_or_else(|| n.to_string()))
        }
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file. Each required column is cast to text and then goes
/// through the same cell parsing as CSV, so dates may be stored as
/// `Date32`, `Timestamp` or strings, and numbers as any numeric type.
fn load_parquet(path: &Path) -> Result<OrderDataset> {
    let file = std::fs::File::open(path).map_err(|e| DashboardError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let positions = {
        let schema = builder.schema();
        resolve_columns(|name| schema.index_of(name).ok())?
    };
    let reader = builder.build()?;

    let mut orders = OrderAccumulator::default();
    for batch_result in reader {
        let batch = batch_result?;

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(positions.len());
        for pos in positions {
            columns.push(cast(batch.column(pos), &DataType::Utf8)?);
        }

        for row in 0..batch.num_rows() {
            let cells: RawCells<'_> = std::array::from_fn(|i| {
                let text = columns[i].as_string::<i32>();
                if text.is_null(row) {
                    None
                } else {
                    Some(text.value(row))
                }
            });
            orders.push(&cells)?;
        }
    }

    Ok(orders.finish())
}

// ---------------------------------------------------------------------------
// Cell parsing shared by every format
// ---------------------------------------------------------------------------

/// Collects parsed rows and keeps running totals of revenue and quantity.
///
/// Every aggregate over a selection is bounded by these totals, so a load
/// that succeeds can be summed in any grouping without overflow.
#[derive(Default)]
struct OrderAccumulator {
    records: Vec<OrderRecord>,
    revenue: Decimal,
    quantity: u64,
}

impl OrderAccumulator {
    fn push(&mut self, cells: &RawCells<'_>) -> Result<()> {
        let row = self.records.len();
        let record = build_record(row, cells)?;

        self.revenue = self.revenue.checked_add(record.revenue).ok_or_else(|| {
            DashboardError::parse(
                row,
                Column::Price.name(),
                &record.price.to_string(),
                "revenue total out of range",
            )
        })?;
        self.quantity = self.quantity.checked_add(record.quantity).ok_or_else(|| {
            DashboardError::parse(
                row,
                Column::Quantity.name(),
                &record.quantity.to_string(),
                "quantity total out of range",
            )
        })?;

        self.records.push(record);
        Ok(())
    }

    fn finish(self) -> OrderDataset {
        OrderDataset::from_records(self.records)
    }
}

fn build_record(row: usize, cells: &RawCells<'_>) -> Result<OrderRecord> {
    let mut text = [""; 8];
    for ((slot, cell), column) in text.iter_mut().zip(cells).zip(Column::ALL) {
        *slot = cell
            .map(str::trim)
            .ok_or_else(|| DashboardError::parse(row, column.name(), "", "missing value"))?;
    }
    let [order_id, order_date, customer_name, product, city, quantity, price, payment_method] =
        text;

    let order_date = parse_order_date(order_date).ok_or_else(|| {
        DashboardError::parse(row, Column::OrderDate.name(), order_date, "not a date")
    })?;
    let quantity = parse_quantity(quantity)
        .map_err(|reason| DashboardError::parse(row, Column::Quantity.name(), quantity, reason))?;
    let price = parse_price(price)
        .map_err(|reason| DashboardError::parse(row, Column::Price.name(), price, reason))?;
    if Decimal::from(quantity).checked_mul(price).is_none() {
        return Err(DashboardError::parse(
            row,
            Column::Price.name(),
            &price.to_string(),
            "revenue out of range",
        ));
    }

    Ok(OrderRecord::new(
        order_id,
        order_date,
        customer_name,
        product,
        city,
        quantity,
        price,
        payment_method,
    ))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a date or datetime cell. Offsets are dropped, keeping wall-clock time.
pub fn parse_order_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_decimal(s: &str) -> std::result::Result<Decimal, rust_decimal::Error> {
    Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s))
}

/// Integer quantities; integral decimals such as `2.0` are accepted.
fn parse_quantity(s: &str) -> std::result::Result<u64, &'static str> {
    if let Ok(q) = s.parse::<u64>() {
        return Ok(q);
    }
    let d = parse_decimal(s).map_err(|_| "not an integer")?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err("negative quantity");
    }
    if !d.fract().is_zero() {
        return Err("fractional quantity");
    }
    d.to_u64().ok_or("quantity out of range")
}

fn parse_price(s: &str) -> std::result::Result<Decimal, &'static str> {
    let d = parse_decimal(s).map_err(|_| "not a decimal number")?;
    if d.is_sign_negative() && !d.is_zero() {
        return Err("negative price");
    }
    Ok(d)
}
