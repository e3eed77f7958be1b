//! HOPE REST API
//!
//! HTTP API layer for the report service, built with Axum.
//!
//! # Endpoints
//!
//! ## Reports
//! - `POST /api/v1/reports/hospital/pdf` - Hospital statistics for a year, quarter or month
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use hope::api::{serve, AppState};
//! use hope::config::Config;
//! use hope::report::ReportEngine;
//! use hope::store::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (config, _source) = Config::load_default();
//!     let store = Arc::new(SqliteStore::open(&config.storage.database_path)?);
//!     let engine = ReportEngine::new(store, config.report.settings());
//!
//!     let state = AppState::new(engine, config.api.clone());
//!     serve(state, &config.api).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use crate::config::ApiConfig;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().route(
        "/reports/hospital/pdf",
        post(routes::report::hospital_pdf),
    );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Permissive when no origins are configured
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HOPE report API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("HOPE report API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ReportEngine, ReportSettings};
    use crate::store::{EntityKind, RecordStore, SqliteStore};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    async fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("records.db")).unwrap();

        let created = Utc
            .with_ymd_and_hms(2025, 3, 14, 9, 30, 0)
            .unwrap()
            .timestamp_millis();
        store
            .insert_batch(EntityKind::Patient, vec![created; 3])
            .await
            .unwrap();
        store.insert(EntityKind::Report, created).await.unwrap();

        let engine = ReportEngine::new(Arc::new(store), ReportSettings::default());
        let state = AppState::new(engine, ApiConfig::default());

        (build_router(state), dir)
    }

    /// App whose database file has been replaced by a directory
    fn create_broken_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path().join("records.db")).unwrap();
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        let engine = ReportEngine::new(Arc::new(store), ReportSettings::default());
        let state = AppState::new(engine, ApiConfig::default());

        (build_router(state), dir)
    }

    fn report_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/reports/hospital/pdf")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_with_broken_store() {
        let (app, _dir) = create_broken_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "ok");
    }

    #[tokio::test]
    async fn test_year_report_pdf() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(report_request("type=year&year=2025")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"hospital-estadisticas-Year 2025.pdf\""));
        assert!(disposition.contains("filename*=UTF-8''hospital-estadisticas-Year%202025.pdf"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_quarter_report_filename() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(report_request("type=QUARTER&year=2025abc&quarter=1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("filename=\"hospital-estadisticas-Quarter 1 - 2025.pdf\""));
    }

    #[tokio::test]
    async fn test_empty_form_defaults_to_current_year() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(report_request("")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_bodyless_request_defaults_to_current_year() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reports/hospital/pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let year = chrono::Datelike::year(&Utc::now());
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains(&format!("filename=\"hospital-estadisticas-Year {}.pdf\"", year)));
    }

    #[tokio::test]
    async fn test_non_form_body_is_json_400() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/reports/hospital/pdf")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"type":"year"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/json"));
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("Content-Type"));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_year_zero_falls_back_to_current_year() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(report_request("type=year&year=0")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(!disposition.contains("Year 0.pdf"));
    }

    #[tokio::test]
    async fn test_invalid_quarter() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(report_request("type=quarter&year=2025&quarter=5"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("quarter"));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_missing_month() {
        let (app, _dir) = create_test_app().await;

        let response = app
            .oneshot(report_request("type=month&year=2025"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("month"));
    }

    #[tokio::test]
    async fn test_invalid_type() {
        let (app, _dir) = create_test_app().await;

        let response = app.oneshot(report_request("type=week")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["message"].as_str().unwrap().contains("'type'"));
    }

    #[tokio::test]
    async fn test_store_failure_is_500() {
        let (app, _dir) = create_broken_app();

        let response = app
            .oneshot(report_request("type=month&year=2025&month=2"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key("x-request-id"));
        let body = json_body(response).await;
        assert_eq!(body["message"], error::REPORT_FAILURE_MESSAGE);
        assert!(body["error"].as_str().unwrap().contains("Aggregation failed"));
    }
}
