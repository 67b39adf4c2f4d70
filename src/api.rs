//! HTTP endpoints for querying stored signals.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/signals/search` | Filter and paginate signals |
//! | `GET` | `/api/signals/symbols` | Distinct symbols |
//! | `GET` | `/api/signals/models` | Distinct model names |
//! | `POST` | `/api/signals/summary` | BUY/SELL/HOLD counts per bucket |
//! | `GET` | `/api/signals/health` | Liveness |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::ServiceError;
use crate::service::dto::{SignalQueryRequest, SummaryRequest};
use crate::service::SignalService;

/// Application state shared across all handlers.
pub type AppState = Arc<SignalService>;

/// Creates the signal REST API router, nested under `/api/signals`.
pub fn signal_router(service: AppState) -> Router {
    Router::new()
        .route("/api/signals/search", post(search))
        .route("/api/signals/symbols", get(symbols))
        .route("/api/signals/models", get(models))
        .route("/api/signals/summary", post(summary))
        .route("/api/signals/health", get(health))
        .with_state(service)
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!("Rejected request: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// `POST /api/signals/search`: filter and paginate signals.
async fn search(
    State(service): State<AppState>,
    Json(request): Json<SignalQueryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(service.search(&request).await?))
}

/// `GET /api/signals/symbols`: sorted distinct symbols.
async fn symbols(State(service): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(service.distinct_symbols().await?))
}

/// `GET /api/signals/models`: sorted distinct model names.
async fn models(State(service): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(service.distinct_models().await?))
}

/// `POST /api/signals/summary`: bucketed BUY/SELL/HOLD counts.
async fn summary(
    State(service): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(service.summary(&request).await?))
}

/// `GET /api/signals/health`: liveness.
async fn health(State(service): State<AppState>) -> &'static str {
    service.health()
}
