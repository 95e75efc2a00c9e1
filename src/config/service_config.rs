//! Service settings loaded from flags and environment

use crate::cache::CacheConfig;
use crate::upstream::{UpstreamConfig, DEFAULT_BASE_URL, DEFAULT_FETCH_LIMIT};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;

/// Flags shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// data.gov.in API key
    #[arg(long, env = "DATA_GOV_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Path to the SQLite cache database
    #[arg(long, env = "MGNREGA_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "MGNREGA_BIND", default_value = "0.0.0.0", global = true)]
    pub bind: String,

    /// Port to listen on
    #[arg(short, long, env = "MGNREGA_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Upstream resource URL
    #[arg(long, env = "MGNREGA_UPSTREAM_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub upstream_url: String,

    /// Result-count ceiling per upstream request
    #[arg(long, env = "MGNREGA_FETCH_LIMIT", default_value_t = DEFAULT_FETCH_LIMIT, global = true)]
    pub limit: u32,

    /// Upstream request timeout in seconds
    #[arg(long, env = "MGNREGA_UPSTREAM_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout_secs: u64,
}

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_key: String,
    pub database: PathBuf,
    pub bind: String,
    pub port: u16,
    pub upstream_url: String,
    pub fetch_limit: u32,
    pub upstream_timeout: Duration,
}

impl From<ServiceArgs> for ServiceConfig {
    fn from(args: ServiceArgs) -> Self {
        Self {
            api_key: args.api_key.unwrap_or_default(),
            database: args.database.unwrap_or_default(),
            bind: args.bind,
            port: args.port,
            upstream_url: args.upstream_url,
            fetch_limit: args.limit,
            upstream_timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

impl ServiceConfig {
    /// Address the server binds to, e.g. `0.0.0.0:5000`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn upstream(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.upstream_url.clone(),
            api_key: self.api_key.clone(),
            limit: self.fetch_limit,
            timeout: self.upstream_timeout,
        }
    }

    pub fn cache(&self) -> CacheConfig {
        CacheConfig::new(&self.database)
    }
}
