//! # HTTP API
//!
//! | Method | Path           | Body | Response                          |
//! |--------|----------------|------|-----------------------------------|
//! | GET    | `/health`      | -    | `{"status": "ok", "version": ..}` |
//! | GET    | `/definitions` | -    | component and tier tables         |
//! | POST   | `/score`       | CSV  | scored rows and diagnostics       |
//! | POST   | `/summary`     | CSV  | summary report                    |
//!
//! Scoring is CPU-bound, so each request runs on the blocking pool.
//!
//! Errors come back as `{"error": message, ...}`: engine validation errors
//! are 422 with the structured error under `details`, CSV framing errors are
//! 400.

use crate::cli::{read_dataset, score_dataset, scored_to_json};
use crate::error::Error;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::Value;
use skutier_core::{Engine, EngineError, definitions};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

/// Build the router with all routes and layers.
pub fn create_router(engine: Engine) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/definitions", get(definitions_handler))
        .route("/score", post(score_handler))
        .route("/summary", post(summary_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(AppState::new(engine))
}

/// Bind and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, engine: Engine) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, create_router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "cannot listen for shutdown signal");
    }
    info!("shutting down");
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn definitions_handler() -> Json<skutier_core::Definitions> {
    Json(definitions())
}

async fn score_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let value = tokio::task::spawn_blocking(move || -> Result<Value, Error> {
        let dataset = read_dataset(&body[..])?;
        let scored = score_dataset(&engine, &dataset)?;
        Ok(scored_to_json(&scored))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(value))
}

async fn summary_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let value = tokio::task::spawn_blocking(move || -> Result<Value, Error> {
        let dataset = read_dataset(&body[..])?;
        let scored = score_dataset(&engine, &dataset)?;
        Ok(serde_json::to_value(scored.summary())?)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(value))
}

// =============================================================================
// ERRORS
// =============================================================================

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<EngineError>,
}

impl ErrorBody {
    fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// Handler failure, mapped onto a status code.
#[derive(Debug)]
pub enum ApiError {
    App(Error),
    Internal(String),
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self::App(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::App(Error::Engine(engine_error)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: engine_error.to_string(),
                    details: Some(engine_error),
                },
            ),
            ApiError::App(error @ Error::Csv(_)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::message(error.to_string()))
            }
            ApiError::App(error) => {
                error!(error = %error, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message(error.to_string()))
            }
            ApiError::Internal(message) => {
                error!(error = %message, "scoring task failed");
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::message("internal error"))
            }
        };
        (status, Json(body)).into_response()
    }
}
