use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::{info, warn};

use sales_dashboard::config::FilterConfig;
use sales_dashboard::data::loader::load_file;
use sales_dashboard::{report, FilterSpec, Session};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "sales-dashboard", version, about = "Sales dashboard views for an order table")]
struct Cli {
    /// Order table (.csv, .json or .parquet)
    file: PathBuf,

    /// JSON file with a partial filter selection
    #[arg(long)]
    filter: Option<PathBuf>,

    /// First order date to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last order date to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Product to include; repeat for several
    #[arg(long = "product")]
    products: Vec<String>,

    /// City to include; repeat for several
    #[arg(long = "city")]
    cities: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    fn flag_config(&self) -> FilterConfig {
        FilterConfig {
            date_from: self.from,
            date_to: self.to,
            products: non_empty(&self.products),
            cities: non_empty(&self.cities),
        }
    }
}

/// An absent flag leaves the field unset rather than selecting nothing.
fn non_empty(values: &[String]) -> Option<BTreeSet<String>> {
    (!values.is_empty()).then(|| values.iter().cloned().collect())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dataset = load_file(&cli.file)
        .with_context(|| format!("loading orders from {}", cli.file.display()))?;
    let mut session = Session::new(Arc::new(dataset));

    let file_config = match &cli.filter {
        Some(path) => FilterConfig::from_json_file(path)
            .with_context(|| format!("reading filter from {}", path.display()))?,
        None => FilterConfig::default(),
    };
    let spec = file_config
        .merged_with(cli.flag_config())
        .resolve(FilterSpec::universe(session.dataset()));
    if spec.date_from > spec.date_to {
        warn!("date range {} .. {} is reversed; nothing will match", spec.date_from, spec.date_to);
    }
    session.set_filter(spec);

    let dashboard = session.dashboard();
    info!(
        "{} of {} orders selected",
        dashboard.kpis.order_count,
        session.dataset().len()
    );

    let output = match cli.format {
        Format::Json if cli.pretty => serde_json::to_string_pretty(&dashboard)?,
        Format::Json => serde_json::to_string(&dashboard)?,
        Format::Text => report::render_text(&dashboard),
    };
    println!("{output}");
    Ok(())
}
