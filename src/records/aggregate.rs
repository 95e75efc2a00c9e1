//! Grouping raw rows by district/year/month and averaging their metrics

use super::metric::{Metric, MetricValues};
use super::raw::RawRecord;
use serde::Serialize;
use std::collections::HashMap;

/// Composite grouping key: district, financial year, normalized month
///
/// Components compare with exact, case-sensitive string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    pub district_name: String,
    pub fin_year: String,
    pub month: String,
}

impl AggregateKey {
    pub fn of(record: &RawRecord) -> Self {
        Self {
            district_name: record.district_name.clone().unwrap_or_default(),
            fin_year: record.fin_year.clone().unwrap_or_default(),
            month: record.normalized_month().to_string(),
        }
    }
}

/// One averaged row per [`AggregateKey`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRecord {
    pub state_name: String,
    pub district_name: String,
    pub fin_year: String,
    pub month: String,
    pub state_code: Option<String>,
    #[serde(flatten)]
    pub metrics: MetricValues,
}

impl AggregateRecord {
    /// Reduce a non-empty group; identity fields come from its first member
    fn from_group(key: AggregateKey, group: &[RawRecord]) -> Self {
        let first = group.first();

        let metrics = Metric::ALL
            .iter()
            .map(|m| (*m, mean_of(group.iter().map(|r| r.metric(*m)))))
            .collect();

        Self {
            state_name: first
                .and_then(|r| r.state_name.clone())
                .unwrap_or_default(),
            district_name: key.district_name,
            fin_year: key.fin_year,
            month: key.month,
            state_code: first.and_then(|r| r.state_code.clone()),
            metrics,
        }
    }

    pub fn key(&self) -> AggregateKey {
        AggregateKey {
            district_name: self.district_name.clone(),
            fin_year: self.fin_year.clone(),
            month: self.month.clone(),
        }
    }
}

/// Partition records by [`AggregateKey`] in one linear pass
///
/// Groups come back in first-encounter order; members keep their upstream order.
pub fn group_records(records: Vec<RawRecord>) -> Vec<(AggregateKey, Vec<RawRecord>)> {
    let mut index: HashMap<AggregateKey, usize> = HashMap::new();
    let mut groups: Vec<(AggregateKey, Vec<RawRecord>)> = Vec::new();

    for record in records {
        let key = AggregateKey::of(&record);
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(record),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![record]));
            }
        }
    }

    groups
}

/// Group and average upstream records, one output row per distinct key
pub fn aggregate(records: Vec<RawRecord>) -> Vec<AggregateRecord> {
    group_records(records)
        .into_iter()
        .map(|(key, group)| AggregateRecord::from_group(key, &group))
        .collect()
}

/// Mean of the present values rounded to 2 decimals; `None` when none are present
pub fn mean_of(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| round2(sum / count as f64))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
