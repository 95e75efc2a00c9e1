//! Dropdown values derived from aggregated records

use crate::records::AggregateRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// Distinct districts and financial years present in a result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Ascending
    pub districts: Vec<String>,
    /// Most recent first
    pub years: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[AggregateRecord]) -> Self {
        let districts: BTreeSet<&str> = records
            .iter()
            .map(|r| r.district_name.as_str())
            .filter(|d| !d.is_empty())
            .collect();
        let years: BTreeSet<&str> = records
            .iter()
            .map(|r| r.fin_year.as_str())
            .filter(|y| !y.is_empty())
            .collect();

        Self {
            districts: districts.into_iter().map(String::from).collect(),
            years: years.into_iter().rev().map(String::from).collect(),
        }
    }
}
