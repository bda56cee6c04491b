use actix_web::{http::StatusCode, web, HttpResponse};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::response::{self, ApiResponse};
use crate::AppState;

/// Liveness
pub async fn healthcheck() -> HttpResponse {
    response::ok("Service is Healthy", "Health check passed")
}

/// Readiness: 503 until the store answers
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    match state.health.ping().await {
        Ok(()) => response::ok("Store is reachable", "Service is ready"),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            ApiResponse::<serde_json::Value>::failure(
                StatusCode::SERVICE_UNAVAILABLE,
                "Store is unreachable",
            )
            .into_response()
        }
    }
}

pub async fn metrics_handler() -> Result<HttpResponse> {
    let body = metrics::render().map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}
