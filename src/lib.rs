//! Sales dashboard core: load an order table once, then filter and aggregate
//! it as often as the user changes the selection.

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;

pub use data::aggregate::Dashboard;
pub use data::filter::FilterSpec;
pub use data::model::{OrderDataset, OrderRecord};
pub use error::{DashboardError, Result};
pub use state::Session;
