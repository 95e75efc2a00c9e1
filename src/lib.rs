//! mgnrega-dash - Caching proxy for MGNREGA district statistics
//!
//! Fetches district-level records from the data.gov.in open-data API, groups
//! them by (district, financial year, month), averages each metric per group,
//! and keeps the results in a SQLite read-through cache in front of the
//! upstream API.
//!
//! # Architecture
//!
//! - **records**: Raw upstream rows, metric coercion, grouping and aggregation
//! - **upstream**: data.gov.in client behind the `RecordSource` trait
//! - **cache**: SQLite store behind the `AggregateStore` trait
//! - **aggregator**: Cache-or-fetch pipeline tying the two together
//! - **server**: axum HTTP API for the dashboard frontend
//! - **config**: Flags, environment and validation
//! - **metrics**: Prometheus counters for cache and upstream behaviour

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod records;

// Components
pub mod aggregator;
pub mod cache;
pub mod metrics;
pub mod server;
pub mod upstream;

// Re-exports
pub use error::{MgnregaError, Result};
