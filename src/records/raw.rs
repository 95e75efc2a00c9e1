//! Upstream rows and ingestion-time normalization

use super::metric::Metric;
use serde_json::{Map, Value};

/// Month label used when a record carries neither `month` nor `Month`
pub const UNKNOWN_MONTH: &str = "N/A";

/// One row as returned by the upstream open-data API
///
/// Built with [`RawRecord::from_json`], which folds the upstream's `month` /
/// `Month` casing into a single field and coerces metric values to numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub state_name: Option<String>,
    pub district_name: Option<String>,
    pub fin_year: Option<String>,
    pub month: Option<String>,
    pub state_code: Option<String>,
    metrics: [Option<f64>; Metric::COUNT],
}

impl RawRecord {
    /// Normalize one upstream JSON row
    ///
    /// Non-object values produce a record with every field absent.
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let mut metrics = [None; Metric::COUNT];
        for metric in Metric::ALL {
            metrics[metric.index()] = obj.get(metric.wire_name()).and_then(coerce_number);
        }

        Self {
            state_name: text_field(obj, "state_name"),
            district_name: text_field(obj, "district_name"),
            fin_year: text_field(obj, "fin_year"),
            month: text_field(obj, "month").or_else(|| text_field(obj, "Month")),
            state_code: text_field(obj, "state_code"),
            metrics,
        }
    }

    /// Coerced value of a metric, `None` when absent or non-numeric
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics[metric.index()]
    }

    /// Month used for grouping, falling back to [`UNKNOWN_MONTH`]
    pub fn normalized_month(&self) -> &str {
        self.month.as_deref().unwrap_or(UNKNOWN_MONTH)
    }
}

/// Coerce an untyped wire value to a finite number
///
/// Numbers pass through; strings are trimmed and parsed. Blank strings,
/// null, booleans, arrays and objects yield `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read an identity field as text; blank strings count as absent
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_lowercase_month() {
        let record = RawRecord::from_json(&json!({
            "state_name": "BIHAR",
            "district_name": "PATNA",
            "fin_year": "2023-2024",
            "month": "April",
            "state_code": "05",
            "Approved_Labour_Budget": "100"
        }));

        assert_eq!(record.state_name.as_deref(), Some("BIHAR"));
        assert_eq!(record.district_name.as_deref(), Some("PATNA"));
        assert_eq!(record.normalized_month(), "April");
        assert_eq!(record.state_code.as_deref(), Some("05"));
        assert_eq!(record.metric(Metric::ApprovedLabourBudget), Some(100.0));
        assert_eq!(record.metric(Metric::TotalWorkers), None);
    }

    #[test]
    fn test_from_json_capitalized_month() {
        let upper = RawRecord::from_json(&json!({ "Month": "May" }));
        let lower = RawRecord::from_json(&json!({ "month": "May" }));
        assert_eq!(upper.month, lower.month);
    }

    #[test]
    fn test_lowercase_month_wins_over_capitalized() {
        let record = RawRecord::from_json(&json!({ "month": "June", "Month": "July" }));
        assert_eq!(record.normalized_month(), "June");
    }

    #[test]
    fn test_missing_month_falls_back() {
        let record = RawRecord::from_json(&json!({ "district_name": "GAYA", "month": "  " }));
        assert_eq!(record.month, None);
        assert_eq!(record.normalized_month(), UNKNOWN_MONTH);
    }

    #[test]
    fn test_numeric_identity_fields_become_text() {
        let record = RawRecord::from_json(&json!({ "state_code": 5, "fin_year": null }));
        assert_eq!(record.state_code.as_deref(), Some("5"));
        assert_eq!(record.fin_year, None);
    }

    #[test]
    fn test_non_object_row() {
        assert_eq!(RawRecord::from_json(&json!("garbage")), RawRecord::default());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!("42")), Some(42.0));
        assert_eq!(coerce_number(&json!(" 3.5 ")), Some(3.5));
        assert_eq!(coerce_number(&json!(7)), Some(7.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("NA")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }
}
