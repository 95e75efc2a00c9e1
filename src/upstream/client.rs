//! data.gov.in client for the MGNREGA district dataset

use super::RecordSource;
use crate::metrics;
use crate::records::{Filters, RawRecord};
use crate::{MgnregaError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// MGNREGA district-wise monthly dataset on data.gov.in
pub const DEFAULT_BASE_URL: &str =
    "https://api.data.gov.in/resource/ee03643a-ee4c-48c2-ac30-9f2ff26ab722";

/// Result-count ceiling sent with every request
pub const DEFAULT_FETCH_LIMIT: u32 = 1000;

/// Per-request timeout for upstream fetches
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Upstream endpoint settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    pub limit: u32,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            limit: DEFAULT_FETCH_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for the open-data API
pub struct DataGovClient {
    client: Client,
    config: UpstreamConfig,
}

impl DataGovClient {
    /// Create a new client
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// Full request URL for a filter selection, API key included
    pub fn request_url(&self, filters: &Filters) -> String {
        let mut url = format!(
            "{}?api-key={}&format=json&limit={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.config.api_key),
            self.config.limit
        );

        let pairs = [
            ("state_name", &filters.state),
            ("district_name", &filters.district),
            ("fin_year", &filters.year),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                url.push_str(&format!("&filters[{}]={}", field, urlencoding::encode(value)));
            }
        }

        url
    }

    async fn fetch_body(&self, filters: &Filters) -> Result<Value> {
        // reqwest errors embed the request URL, which carries the API key
        let response = self
            .client
            .get(self.request_url(filters))
            .send()
            .await
            .map_err(|e| MgnregaError::UpstreamFetch(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MgnregaError::UpstreamFetch(format!("HTTP {}", status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| MgnregaError::UpstreamFetch(e.without_url().to_string()))?;

        serde_json::from_str(&text)
            .map_err(|e| MgnregaError::UpstreamFetch(format!("response body is not JSON: {}", e)))
    }
}

#[async_trait]
impl RecordSource for DataGovClient {
    async fn fetch_records(&self, filters: &Filters) -> Result<Vec<RawRecord>> {
        debug!(
            state = ?filters.state,
            district = ?filters.district,
            year = ?filters.year,
            limit = self.config.limit,
            "Fetching upstream records"
        );

        let started = Instant::now();
        let result = self.fetch_body(filters).await.and_then(|body| parse_records(&body));
        metrics::record_upstream_fetch(&result, started.elapsed().as_secs_f64());

        match &result {
            Ok(records) => info!(records = records.len(), "Upstream fetch complete"),
            Err(e) => error!(error = %e, "Upstream fetch failed"),
        }

        result
    }
}

/// Extract the `records` array from an upstream body
pub fn parse_records(body: &Value) -> Result<Vec<RawRecord>> {
    let records = body
        .get("records")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            MgnregaError::InvalidUpstreamResponse("missing `records` array".to_string())
        })?;

    Ok(records.iter().map(RawRecord::from_json).collect())
}
