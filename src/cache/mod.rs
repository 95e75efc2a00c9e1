//! Cache store for aggregated records
//!
//! A durable read-through cache in front of the upstream API. Rows are
//! accumulated across requests and never expire, update or get deleted.

mod sqlite;

pub use sqlite::{Cache, CacheConfig, CacheStats, CachedRow};

use crate::records::{AggregateRecord, Filters};
use crate::Result;

/// Trait for aggregate storage backends
pub trait AggregateStore: Send {
    /// Rows whose state/district/year match the supplied filters exactly
    fn lookup(&self, filters: &Filters) -> Result<Vec<AggregateRecord>>;

    /// Insert-if-absent; returns the number of rows actually inserted
    fn insert_all(&self, records: &[AggregateRecord]) -> Result<usize>;
}
