//! Prediction handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use honeygate_core::{GateDecision, Label};

use crate::middleware::identity::ClientContext;
use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub fraud_prediction: Label,
}

/// Run a payload through the gate and, if admitted, the classifier.
///
/// The decision runs on a detached blocking task: the classifier is CPU
/// bound, and suspicion updates must land even if the client hangs up.
pub async fn predict(
    State(state): State<AppState>,
    client: ClientContext,
    body: Bytes,
) -> AppResult<Json<PredictResponse>> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::Malformed(format!("Invalid JSON body: {}", e)))?;

    let gate = Arc::clone(&state.gate);
    let identity = client.identity.clone();
    let decision = tokio::task::spawn_blocking(move || gate.decide(&identity, &payload))
        .await
        .map_err(|e| AppError::InternalError(format!("Gate task failed: {}", e)))??;

    tracing::debug!("Gate decision for {}: {}", client.identity, decision.kind());

    // Both security denials share one response
    if decision.is_security_denial() {
        return Err(AppError::SuspiciousActivity);
    }

    match decision {
        GateDecision::Allow { label, .. } => Ok(Json(PredictResponse { fraud_prediction: label })),
        GateDecision::DenyMalformed(reason) => Err(AppError::Malformed(reason)),
        _ => Err(AppError::SuspiciousActivity),
    }
}
