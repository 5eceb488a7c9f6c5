use crate::output::HealthStatus;
use axum::Json;
use tracing::{debug, instrument};

/// Liveness probe for load balancers.
///
/// GET /health → `{"status": "ok", "timestamp": "<RFC 3339>"}`
#[instrument]
pub async fn health_check() -> Json<HealthStatus> {
    debug!("Health check endpoint accessed");
    Json(HealthStatus::ok())
}
