//! Configuration validation
//!
//! Validates service configuration before anything binds or connects:
//! - API key and database path are present
//! - Port and fetch limit are non-zero
//! - Upstream URL is http(s)

use super::service_config::ServiceConfig;
use crate::MgnregaError;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a service configuration, collecting every problem
pub fn validate_config(config: &ServiceConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.api_key.trim().is_empty() {
        errors.push(ValidationError::new(
            "api_key",
            "Upstream API key is required (set DATA_GOV_API_KEY or --api-key)",
        ));
    }

    if config.database.as_os_str().is_empty() {
        errors.push(ValidationError::new(
            "database",
            "Cache database path is required (set MGNREGA_DATABASE or --database)",
        ));
    }

    if config.port == 0 {
        errors.push(ValidationError::new("port", "Port must be greater than 0"));
    }

    if config.fetch_limit == 0 {
        errors.push(ValidationError::new(
            "limit",
            "Fetch limit must be greater than 0",
        ));
    }

    if config.upstream_timeout.is_zero() {
        errors.push(ValidationError::new(
            "timeout_secs",
            "Upstream timeout must be greater than 0",
        ));
    }

    if !config.upstream_url.starts_with("http://") && !config.upstream_url.starts_with("https://")
    {
        errors.push(ValidationError::new(
            "upstream_url",
            format!("Invalid URL '{}'. Must start with http:// or https://", config.upstream_url),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate and convert errors into a single configuration error
pub fn validate_config_result(config: &ServiceConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        MgnregaError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}
