use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::aggregate::Dashboard;
use crate::data::filter::{filtered_indices, FilterSpec};
use crate::data::model::{OrderDataset, OrderRecord};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One user's view of a shared dataset, independent of rendering.
///
/// The dataset is an immutable snapshot; many sessions may hold the same
/// `Arc` and read it concurrently.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Arc<OrderDataset>,

    /// Current selection.
    filter: FilterSpec,

    /// Indices of records passing the current filter (cached).
    visible_indices: Vec<usize>,
}

impl Session {
    /// Start a session with everything selected.
    pub fn new(dataset: Arc<OrderDataset>) -> Self {
        let filter = FilterSpec::universe(&dataset);
        let visible_indices = (0..dataset.len()).collect();
        Session {
            dataset,
            filter,
            visible_indices,
        }
    }

    pub fn dataset(&self) -> &OrderDataset {
        &self.dataset
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn visible_indices(&self) -> &[usize] {
        &self.visible_indices
    }

    /// Records passing the current filter, in source order.
    pub fn visible_records(&self) -> Vec<&OrderRecord> {
        self.visible_indices
            .iter()
            .map(|&i| &self.dataset.records[i])
            .collect()
    }

    /// Every derived view for the current selection.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard::compute(&self.visible_records())
    }

    /// Replace the whole selection.
    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
        self.refilter();
    }

    /// Back to the universe selection.
    pub fn reset(&mut self) {
        self.set_filter(FilterSpec::universe(&self.dataset));
    }

    pub fn set_date_range(&mut self, from: NaiveDate, to: NaiveDate) {
        self.filter.date_from = from;
        self.filter.date_to = to;
        self.refilter();
    }

    /// Toggle a single product in the selection.
    pub fn toggle_product(&mut self, product: &str) {
        toggle(&mut self.filter.products, product);
        self.refilter();
    }

    /// Toggle a single city in the selection.
    pub fn toggle_city(&mut self, city: &str) {
        toggle(&mut self.filter.cities, city);
        self.refilter();
    }

    pub fn select_all_products(&mut self) {
        self.filter.products = self.dataset.products.clone();
        self.refilter();
    }

    pub fn select_no_products(&mut self) {
        self.filter.products.clear();
        self.refilter();
    }

    pub fn select_all_cities(&mut self) {
        self.filter.cities = self.dataset.cities.clone();
        self.refilter();
    }

    pub fn select_no_cities(&mut self) {
        self.filter.cities.clear();
        self.refilter();
    }

    /// Recompute `visible_indices` after a filter change.
    fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.dataset.records, &self.filter);
    }
}

fn toggle(selected: &mut BTreeSet<String>, value: &str) {
    if !selected.remove(value) {
        selected.insert(value.to_string());
    }
}
