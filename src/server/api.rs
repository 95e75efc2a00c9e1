//! Router, handlers and error mapping

use crate::aggregator::{Aggregator, FilterOptions};
use crate::metrics;
use crate::records::{states::STATES, AggregateRecord, Filters};
use crate::{MgnregaError, Result};
use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// HTTP server wrapping an [`Aggregator`]
pub struct ApiServer {
    aggregator: Aggregator,
}

impl ApiServer {
    pub fn new(aggregator: Aggregator) -> Self {
        Self { aggregator }
    }

    /// Build the router with CORS for the browser frontend
    pub fn router(aggregator: Aggregator) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .max_age(Duration::from_secs(60 * 60));

        Router::new()
            .route("/health", get(health))
            .route("/metrics", get(metrics_handler))
            .route("/api/states", get(list_states))
            .route("/api/mgnrega", get(get_records))
            .route("/api/mgnrega/options", get(get_options))
            .layer(cors)
            .with_state(aggregator)
    }

    /// Run the server on the given address until Ctrl-C or SIGTERM
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            MgnregaError::Config(format!("Failed to bind {}: {}", addr, e))
        })?;

        tracing::info!(addr = addr, "MGNREGA proxy listening");

        axum::serve(listener, Self::router(self.aggregator))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

/// Successful `/api/mgnrega` body
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub records: Vec<AggregateRecord>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query for `/api/mgnrega/options`
#[derive(Debug, Deserialize)]
pub struct OptionsQuery {
    pub state: Option<String>,
}

/// Map a pipeline error to a status and a short client-facing message
///
/// Details stay in the logs; the body only says which class of failure occurred.
pub fn error_response(err: MgnregaError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, message) = match &err {
        MgnregaError::InvalidUpstreamResponse(_) => {
            (StatusCode::BAD_REQUEST, "Invalid upstream response")
        }
        MgnregaError::UpstreamFetch(_) | MgnregaError::Http(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch data")
        }
        e if e.is_storage() => (StatusCode::INTERNAL_SERVER_ERROR, "Storage unavailable"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
    };

    tracing::error!(status = status.as_u16(), kind = err.kind(), error = %err, "Request failed");

    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn metrics_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

async fn list_states() -> impl IntoResponse {
    Json(serde_json::json!({ "states": STATES }))
}

async fn get_records(
    State(aggregator): State<Aggregator>,
    Query(filters): Query<Filters>,
) -> std::result::Result<Json<RecordsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let records = aggregator
        .fetch_and_aggregate(&filters)
        .await
        .map_err(error_response)?;

    Ok(Json(RecordsResponse { records }))
}

async fn get_options(
    State(aggregator): State<Aggregator>,
    Query(query): Query<OptionsQuery>,
) -> std::result::Result<Json<FilterOptions>, (StatusCode, Json<ErrorResponse>)> {
    let options = aggregator
        .filter_options(query.state)
        .await
        .map_err(error_response)?;

    Ok(Json(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AggregateStore, Cache};
    use crate::records::RawRecord;
    use crate::upstream::RecordSource;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FixedSource(Value);

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn fetch_records(&self, _filters: &Filters) -> Result<Vec<RawRecord>> {
            crate::upstream::parse_records(&self.0)
        }
    }

    struct DownSource;

    #[async_trait]
    impl RecordSource for DownSource {
        async fn fetch_records(&self, _filters: &Filters) -> Result<Vec<RawRecord>> {
            Err(MgnregaError::UpstreamFetch("connection refused".into()))
        }
    }

    fn router_with(source: impl RecordSource + 'static) -> Router {
        ApiServer::router(Aggregator::new(Cache::in_memory().unwrap(), source))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (status, body) = get_json(router_with(DownSource), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_states_endpoint() {
        let (status, body) = get_json(router_with(DownSource), "/api/states").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["states"].as_array().unwrap().len(), 34);
        assert_eq!(body["states"][0], "UTTAR PRADESH");
    }

    #[tokio::test]
    async fn test_records_endpoint() {
        let source = FixedSource(json!({
            "records": [
                { "state_name": "BIHAR", "district_name": "PATNA", "fin_year": "2023-2024",
                  "month": "April", "Approved_Labour_Budget": "100" },
                { "state_name": "BIHAR", "district_name": "PATNA", "fin_year": "2023-2024",
                  "month": "April", "Approved_Labour_Budget": "200" }
            ]
        }));

        let (status, body) = get_json(
            router_with(source),
            "/api/mgnrega?state=BIHAR&district=PATNA&year=2023-2024",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["district_name"], "PATNA");
        assert_eq!(records[0]["month"], "April");
        assert_eq!(records[0]["Approved_Labour_Budget"], "150.00");
    }

    #[tokio::test]
    async fn test_invalid_upstream_is_bad_request() {
        let (status, body) =
            get_json(router_with(FixedSource(json!({}))), "/api/mgnrega?state=BIHAR").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid upstream response");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_server_error() {
        let (status, body) = get_json(router_with(DownSource), "/api/mgnrega").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch data");
    }

    #[tokio::test]
    async fn test_cached_rows_served_without_upstream() {
        let cache = Cache::in_memory().unwrap();
        let seeded = crate::records::aggregate(vec![RawRecord::from_json(&json!({
            "state_name": "BIHAR", "district_name": "GAYA", "fin_year": "2023-2024",
            "month": "May", "Total_No_of_Workers": 12
        }))]);
        cache.insert_all(&seeded).unwrap();

        let app = ApiServer::router(Aggregator::new(cache, DownSource));
        let (status, body) = get_json(app, "/api/mgnrega?state=BIHAR").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["records"][0]["Total_No_of_Workers"], "12.00");
    }

    #[tokio::test]
    async fn test_options_endpoint() {
        let source = FixedSource(json!({
            "records": [
                { "state_name": "ASSAM", "district_name": "KAMRUP", "fin_year": "2022-2023" },
                { "state_name": "ASSAM", "district_name": "BAKSA", "fin_year": "2023-2024" }
            ]
        }));

        let (status, body) =
            get_json(router_with(source), "/api/mgnrega/options?state=ASSAM").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["districts"], json!(["BAKSA", "KAMRUP"]));
        assert_eq!(body["years"], json!(["2023-2024", "2022-2023"]));
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        metrics::record_cache_miss();

        let response = router_with(DownSource)
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("mgnrega_cache_lookups_total"));
    }

    #[test]
    fn test_error_response_mapping() {
        let (status, Json(body)) =
            error_response(MgnregaError::StorageUnavailable("locked".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Storage unavailable");

        let (status, _) = error_response(MgnregaError::InvalidUpstreamResponse("x".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
