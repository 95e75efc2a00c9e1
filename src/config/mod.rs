//! Configuration system
//!
//! Service settings come from CLI flags or their environment variables:
//! - Upstream API key, endpoint, result ceiling and timeout
//! - Cache database path
//! - Listen address and port
//!
//! The process refuses to start until [`validate_config`] passes.

mod service_config;
pub mod validation;

pub use service_config::{ServiceArgs, ServiceConfig, DEFAULT_PORT};
pub use validation::{validate_config, validate_config_result, ValidationError};
