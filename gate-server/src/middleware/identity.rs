//! Client identity middleware
//!
//! Resolves the caller's identity once per request and stores it in the
//! request extensions for the rate limiter and the handlers.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use honeygate_core::ClientIdentity;

use crate::AppError;

/// Identity used when neither a socket address nor a trusted header is known
pub const UNKNOWN_CLIENT: &str = "unknown";

/// How the caller's identity is derived
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPolicy {
    pub trust_forwarded_for: bool,
}

/// Client context extracted from the connection
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub identity: ClientIdentity,
}

/// Middleware: resolve the client identity
pub async fn identify_client(
    State(policy): State<IdentityPolicy>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = resolve_identity(&req, policy);
    req.extensions_mut().insert(ClientContext { identity });
    next.run(req).await
}

fn resolve_identity(req: &Request, policy: IdentityPolicy) -> ClientIdentity {
    if policy.trust_forwarded_for {
        let forwarded = req.headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(ip) = forwarded {
            return ClientIdentity::new(ip);
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| ClientIdentity::new(addr.ip().to_string()))
        .unwrap_or_else(|| ClientIdentity::new(UNKNOWN_CLIENT))
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<ClientContext>()
            .cloned()
            .ok_or_else(|| AppError::InternalError("Client identity not resolved".to_string()))
    }
}
