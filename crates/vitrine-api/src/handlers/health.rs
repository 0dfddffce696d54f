use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use vitrine_core::ArtifactName;

use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub storage: String,
}

/// Database failures make the service unhealthy; storage failures only degrade it.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut overall_healthy = true;

    let database = match &state.db_pool {
        None => "in-memory".to_string(),
        Some(pool) => {
            match tokio::time::timeout(CHECK_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await
            {
                Ok(Ok(_)) => "healthy".to_string(),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Database health check failed");
                    overall_healthy = false;
                    format!("unhealthy: {}", e)
                }
                Err(_) => {
                    tracing::error!("Database health check timed out");
                    overall_healthy = false;
                    "timeout".to_string()
                }
            }
        }
    };

    // Lookup of a name that is never generated; verifies connectivity without writing
    let probe = ArtifactName::from_parts(0, 0);
    let storage = match tokio::time::timeout(CHECK_TIMEOUT, state.storage.exists(&probe)).await {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Storage health check warning");
            format!("degraded: {}", e)
        }
        Err(_) => {
            tracing::warn!("Storage health check timed out");
            "timeout".to_string()
        }
    };

    let (status_code, status) = if overall_healthy {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: status.to_string(),
            database,
            storage,
        }),
    )
}
