//! Health check handler.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use starry_core::error::AppError;

use crate::dto::response::HealthResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /console/api/health
///
/// 503 when the directory store cannot be reached.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    match state.stores.directories().health_check().await {
        Ok(true) => {}
        Ok(false) => {
            return Err(AppError::service_unavailable("Directory store is unavailable").into());
        }
        Err(e) => {
            warn!(error = %e, "Store health check failed");
            return Err(AppError::service_unavailable("Directory store is unavailable").into());
        }
    }

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.config.database.provider.to_string(),
    }))
}
