//! Upstream open-data source
//!
//! The pipeline only sees the [`RecordSource`] trait; [`DataGovClient`] is the
//! production implementation talking to api.data.gov.in.

mod client;

pub use client::{
    parse_records, DataGovClient, UpstreamConfig, DEFAULT_BASE_URL, DEFAULT_FETCH_LIMIT,
    DEFAULT_TIMEOUT,
};

use crate::records::{Filters, RawRecord};
use crate::Result;
use async_trait::async_trait;

/// Source of raw MGNREGA rows for a filter selection
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one bounded batch of rows matching the filters
    ///
    /// # Errors
    /// - `UpstreamFetch` when the source is unreachable, answers non-2xx, or
    ///   sends a body that is not JSON
    /// - `InvalidUpstreamResponse` when the body has no `records` array
    async fn fetch_records(&self, filters: &Filters) -> Result<Vec<RawRecord>>;
}
