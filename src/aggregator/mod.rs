//! Fetch/aggregate/cache pipeline
//!
//! Answers a filter selection from the cache store when it has matching rows,
//! otherwise fetches from the upstream source, aggregates per district/year/month
//! and writes the result back to the store.

mod options;
mod pipeline;

pub use options::FilterOptions;
pub use pipeline::Aggregator;
