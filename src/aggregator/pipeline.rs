//! Read-through aggregation pipeline

use super::FilterOptions;
use crate::cache::AggregateStore;
use crate::metrics;
use crate::records::{aggregate, AggregateRecord, Filters};
use crate::upstream::RecordSource;
use crate::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cache-first aggregator over an upstream record source
///
/// Cheap to clone; clones share the same store and source.
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<Mutex<Box<dyn AggregateStore>>>,
    source: Arc<dyn RecordSource>,
}

impl Aggregator {
    pub fn new(store: impl AggregateStore + 'static, source: impl RecordSource + 'static) -> Self {
        let store: Box<dyn AggregateStore> = Box::new(store);
        Self {
            store: Arc::new(Mutex::new(store)),
            source: Arc::new(source),
        }
    }

    /// Aggregate records for a filter selection
    ///
    /// 1. Matching cached rows are returned as-is, without calling upstream.
    /// 2. Otherwise upstream rows are fetched, grouped and averaged.
    /// 3. New aggregates are inserted into the store (insert-if-absent). A
    ///    failed insert is logged; the records are still returned.
    ///
    /// A failed cache lookup is treated as a miss, and the insert step is
    /// skipped for that request.
    ///
    /// # Errors
    /// Upstream failures (`UpstreamFetch`, `InvalidUpstreamResponse`) are
    /// returned unchanged. Storage failures never abort the request.
    pub async fn fetch_and_aggregate(&self, filters: &Filters) -> Result<Vec<AggregateRecord>> {
        let filters = filters.clone().normalized();

        let lookup = self.store.lock().await.lookup(&filters);
        let store_usable = match lookup {
            Ok(rows) if !rows.is_empty() => {
                metrics::record_cache_hit();
                tracing::info!(rows = rows.len(), "Serving aggregates from cache");
                return Ok(rows);
            }
            Ok(_) => {
                metrics::record_cache_miss();
                tracing::debug!("Cache miss, fetching from upstream");
                true
            }
            Err(e) => {
                metrics::record_storage_error("lookup");
                tracing::warn!(error = %e, "Cache lookup failed, fetching from upstream");
                false
            }
        };

        let raw = self.source.fetch_records(&filters).await?;
        let raw_count = raw.len();
        let records = aggregate(raw);

        tracing::info!(
            raw = raw_count,
            aggregated = records.len(),
            "Aggregated upstream records"
        );

        if store_usable && !records.is_empty() {
            let inserted = self.store.lock().await.insert_all(&records);
            match inserted {
                Ok(count) => metrics::record_rows_inserted(count),
                Err(e) => {
                    metrics::record_storage_error("insert");
                    tracing::warn!(error = %e, "Failed to persist aggregates");
                }
            }
        }

        Ok(records)
    }

    /// Districts and financial years available for a state
    pub async fn filter_options(&self, state: Option<String>) -> Result<FilterOptions> {
        let filters = Filters {
            state,
            ..Filters::default()
        };
        let records = self.fetch_and_aggregate(&filters).await?;
        Ok(FilterOptions::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::records::{Metric, RawRecord};
    use crate::MgnregaError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        body: serde_json::Value,
        calls: Arc<AtomicUsize>,
    }

    impl StaticSource {
        fn new(body: serde_json::Value) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    body,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn fetch_records(&self, _filters: &Filters) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            crate::upstream::parse_records(&self.body)
        }
    }

    struct BrokenStore;

    impl AggregateStore for BrokenStore {
        fn lookup(&self, _filters: &Filters) -> Result<Vec<AggregateRecord>> {
            Err(MgnregaError::StorageUnavailable("disk gone".into()))
        }

        fn insert_all(&self, _records: &[AggregateRecord]) -> Result<usize> {
            panic!("insert must be skipped after a failed lookup");
        }
    }

    struct ReadOnlyStore;

    impl AggregateStore for ReadOnlyStore {
        fn lookup(&self, _filters: &Filters) -> Result<Vec<AggregateRecord>> {
            Ok(Vec::new())
        }

        fn insert_all(&self, _records: &[AggregateRecord]) -> Result<usize> {
            Err(MgnregaError::StorageUnavailable("read-only".into()))
        }
    }

    fn patna_body() -> serde_json::Value {
        json!({
            "records": [
                { "state_name": "BIHAR", "district_name": "PATNA", "fin_year": "2023-2024",
                  "month": "April", "Approved_Labour_Budget": "100" },
                { "state_name": "BIHAR", "district_name": "PATNA", "fin_year": "2023-2024",
                  "month": "April", "Approved_Labour_Budget": "200" },
                { "state_name": "BIHAR", "district_name": "GAYA", "fin_year": "2022-2023",
                  "Month": "May", "Approved_Labour_Budget": "50" }
            ]
        })
    }

    #[tokio::test]
    async fn test_miss_fetches_and_populates_cache() {
        let (source, calls) = StaticSource::new(patna_body());
        let aggregator = Aggregator::new(Cache::in_memory().unwrap(), source);
        let filters = Filters::new().state("BIHAR");

        let first = aggregator.fetch_and_aggregate(&filters).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].metrics.get(Metric::ApprovedLabourBudget), Some(150.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = aggregator.fetch_and_aggregate(&filters).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_upstream_response() {
        let (source, calls) = StaticSource::new(json!({}));
        let aggregator = Aggregator::new(Cache::in_memory().unwrap(), source);

        let err = aggregator
            .fetch_and_aggregate(&Filters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MgnregaError::InvalidUpstreamResponse(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_falls_back_to_upstream() {
        let (source, calls) = StaticSource::new(patna_body());
        let aggregator = Aggregator::new(BrokenStore, source);

        let records = aggregator
            .fetch_and_aggregate(&Filters::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_insert_failure_still_returns_records() {
        let (source, _calls) = StaticSource::new(patna_body());
        let aggregator = Aggregator::new(ReadOnlyStore, source);

        let records = aggregator
            .fetch_and_aggregate(&Filters::default())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_upstream_is_not_cached() {
        let (source, calls) = StaticSource::new(json!({ "records": [] }));
        let aggregator = Aggregator::new(Cache::in_memory().unwrap(), source);

        assert!(aggregator
            .fetch_and_aggregate(&Filters::new().state("GOA"))
            .await
            .unwrap()
            .is_empty());
        assert!(aggregator
            .fetch_and_aggregate(&Filters::new().state("GOA"))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_filter_options() {
        let (source, _calls) = StaticSource::new(patna_body());
        let aggregator = Aggregator::new(Cache::in_memory().unwrap(), source);

        let options = aggregator
            .filter_options(Some("BIHAR".to_string()))
            .await
            .unwrap();
        assert_eq!(options.districts, vec!["GAYA", "PATNA"]);
        assert_eq!(options.years, vec!["2023-2024", "2022-2023"]);
    }
}
