//! HTTP API for the dashboard frontend
//!
//! # Routes
//!
//! - `GET /api/mgnrega?state=&district=&year=` - Aggregated records
//! - `GET /api/mgnrega/options?state=` - Districts and years for a state
//! - `GET /api/states` - States offered for selection
//! - `GET /health` - Liveness
//! - `GET /metrics` - Prometheus metrics
//!
//! # Example
//!
//! ```no_run
//! use mgnrega_dash::aggregator::Aggregator;
//! use mgnrega_dash::cache::{Cache, CacheConfig};
//! use mgnrega_dash::server::ApiServer;
//! use mgnrega_dash::upstream::{DataGovClient, UpstreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> mgnrega_dash::Result<()> {
//!     let cache = Cache::new(CacheConfig::new("mgnrega.db"))?;
//!     let client = DataGovClient::new(UpstreamConfig::new("api-key"))?;
//!
//!     ApiServer::new(Aggregator::new(cache, client))
//!         .run("127.0.0.1:5000")
//!         .await
//! }
//! ```

mod api;

pub use api::{error_response, ApiServer, ErrorResponse, OptionsQuery, RecordsResponse};
