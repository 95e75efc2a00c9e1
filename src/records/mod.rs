//! Record model
//!
//! Types flowing through the fetch/aggregate/cache pipeline:
//!
//! - **RawRecord**: one upstream row, normalized at ingestion (month casing,
//!   numeric coercion of metric fields)
//! - **AggregateKey**: district + financial year + month
//! - **AggregateRecord**: per-key averages, the unit served and cached
//! - **Filters**: optional state/district/year selection

mod aggregate;
mod filters;
mod metric;
mod raw;
pub mod states;

pub use aggregate::{aggregate, group_records, mean_of, round2, AggregateKey, AggregateRecord};
pub use filters::Filters;
pub use metric::{Metric, MetricValues};
pub use raw::{coerce_number, RawRecord, UNKNOWN_MONTH};
