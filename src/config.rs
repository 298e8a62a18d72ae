use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::data::filter::FilterSpec;
use crate::error::{DashboardError, Result};

/// A partial filter selection, read from a JSON file or built from CLI flags.
///
/// Every field is optional; unset fields fall back to the dataset universe.
/// `"products": []` is an explicit empty selection, not "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub products: Option<BTreeSet<String>>,
    pub cities: Option<BTreeSet<String>>,
}

impl FilterConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fields set in `other` win over fields set in `self`.
    pub fn merged_with(self, other: FilterConfig) -> FilterConfig {
        FilterConfig {
            date_from: other.date_from.or(self.date_from),
            date_to: other.date_to.or(self.date_to),
            products: other.products.or(self.products),
            cities: other.cities.or(self.cities),
        }
    }

    /// Fill unset fields from `universe`.
    pub fn resolve(self, universe: FilterSpec) -> FilterSpec {
        FilterSpec {
            date_from: self.date_from.unwrap_or(universe.date_from),
            date_to: self.date_to.unwrap_or(universe.date_to),
            products: self.products.unwrap_or(universe.products),
            cities: self.cities.unwrap_or(universe.cities),
        }
    }
}
