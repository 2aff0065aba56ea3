//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use honeygate_core::logic::model::ModelStatus;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: ModelStatus,
    tracked_identities: usize,
    rate_limited_clients: usize,
    suspicion_threshold: u64,
    trap_fields: usize,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model: state.model.status(),
        tracked_identities: state.gate.store().tracked_identities(),
        rate_limited_clients: state.predict_limiter.tracked_clients()
            + state.default_limiter.tracked_clients(),
        suspicion_threshold: state.gate.config().suspicion_threshold,
        trap_fields: state.gate.registry().field_count(),
    })
}
