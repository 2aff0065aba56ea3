//! Error handling
//!
//! Every failure is rendered as `{"error": ..., "status": ...}`. The two
//! security denials share one variant so the response never tells a
//! client which rule fired.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use honeygate_core::GateError;

pub type AppResult<T> = Result<T, AppError>;

pub const SUSPICIOUS_ACTIVITY_MESSAGE: &str = "Access denied due to suspicious activity.";

#[derive(Debug)]
pub enum AppError {
    // Client input errors
    Malformed(String),

    // Security denials (honeypot or repeated suspicion)
    SuspiciousActivity,

    // Rate limiter
    RateLimited { retry_after_secs: u64 },

    // Classifier errors
    ClassifierUnavailable(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Malformed(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::SuspiciousActivity => (StatusCode::FORBIDDEN, SUSPICIOUS_ACTIVITY_MESSAGE),
            AppError::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded"),
            AppError::ClassifierUnavailable(msg) => {
                tracing::error!("Classifier error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Classifier unavailable")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        let mut response = (status, body).into_response();

        if let AppError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        AppError::ClassifierUnavailable(err.to_string())
    }
}
