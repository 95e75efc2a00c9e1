//! Metric fields carried by MGNREGA district records

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One of the numeric fields averaged per aggregate key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    ApprovedLabourBudget,
    AverageWageRate,
    AverageDaysOfEmployment,
    DifferentlyAbledPersonsWorked,
    CompletedWorks,
    OngoingWorks,
    TotalWorkers,
}

impl Metric {
    /// Number of metric fields
    pub const COUNT: usize = 7;

    /// All metrics in wire/column order
    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::ApprovedLabourBudget,
        Metric::AverageWageRate,
        Metric::AverageDaysOfEmployment,
        Metric::DifferentlyAbledPersonsWorked,
        Metric::CompletedWorks,
        Metric::OngoingWorks,
        Metric::TotalWorkers,
    ];

    /// Field name used by the upstream API and by our JSON responses
    pub fn wire_name(self) -> &'static str {
        match self {
            Metric::ApprovedLabourBudget => "Approved_Labour_Budget",
            Metric::AverageWageRate => "Average_Wage_rate_per_day_per_person",
            Metric::AverageDaysOfEmployment => "Average_days_of_employment_provided_per_Household",
            Metric::DifferentlyAbledPersonsWorked => "Differently_abled_persons_worked",
            Metric::CompletedWorks => "Number_of_Completed_Works",
            Metric::OngoingWorks => "Number_of_Ongoing_Works",
            Metric::TotalWorkers => "Total_No_of_Workers",
        }
    }

    /// Column name in the cache store
    pub fn column(self) -> &'static str {
        match self {
            Metric::ApprovedLabourBudget => "approved_labour_budget",
            Metric::AverageWageRate => "average_wage_rate",
            Metric::AverageDaysOfEmployment => "average_days_of_employment",
            Metric::DifferentlyAbledPersonsWorked => "differently_abled_persons_worked",
            Metric::CompletedWorks => "completed_works",
            Metric::OngoingWorks => "ongoing_works",
            Metric::TotalWorkers => "total_workers",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Averaged metric values of one aggregate record
///
/// A metric is `None` when no member of its group had a usable value. It
/// stays `None` through the cache store (NULL column) and only becomes `0`
/// when serialized: a flat map keyed by [`Metric::wire_name`], each value a
/// string with exactly two decimals (`"150.00"`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MetricValues([Option<f64>; Metric::COUNT]);

impl MetricValues {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0[metric.index()]
    }

    /// Value as served, with missing metrics reported as `0`
    pub fn get_or_zero(&self, metric: Metric) -> f64 {
        self.get(metric).unwrap_or_default()
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        self.0[metric.index()] = value;
    }

    /// Iterate `(metric, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Option<f64>)> + '_ {
        Metric::ALL.iter().map(move |m| (*m, self.get(*m)))
    }
}

impl FromIterator<(Metric, Option<f64>)> for MetricValues {
    fn from_iter<I: IntoIterator<Item = (Metric, Option<f64>)>>(iter: I) -> Self {
        let mut values = MetricValues::default();
        for (metric, value) in iter {
            values.set(metric, value);
        }
        values
    }
}

impl Serialize for MetricValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::COUNT))?;
        for metric in Metric::ALL {
            map.serialize_entry(metric.wire_name(), &format!("{:.2}", self.get_or_zero(metric)))?;
        }
        map.end()
    }
}
