//! HoneyGate Server
//!
//! Fraud classifier service behind a honeypot admission gate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        HONEYGATE SERVER                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  request ──► identity ──► rate limiter ──► admission gate    │
//! │                              (429)            │              │
//! │                                               ▼              │
//! │              ┌──────────────┐  ┌──────────────────────────┐  │
//! │              │ Honeypot     │  │ Suspicion Store          │  │
//! │              │ Registry     │  │ (sharded counters)       │  │
//! │              └──────────────┘  └──────────────────────────┘  │
//! │                                               │              │
//! │                                               ▼              │
//! │                                   classifier (ONNX / JSON)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod middleware;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use honeygate_core::logic::model::LoadedModel;
use honeygate_core::{load_classifier, AdmissionGate, Classifier, HoneypotRegistry, SuspicionStore};

pub use error::{AppError, AppResult};
use middleware::identity::IdentityPolicy;
use middleware::rate_limit::RateLimiter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG and LOG_FORMAT, so it is read before logging starts
    dotenvy::dotenv().ok();

    init_tracing();

    // Load configuration
    let config = config::Config::from_env();

    tracing::info!("HoneyGate server starting ({})...", config.environment);
    if config.is_production() && !config.trust_forwarded_for {
        tracing::warn!("TRUST_FORWARDED_FOR is off: behind a proxy every client shares one identity");
    }

    // Load classifier
    let model = load_classifier(&config.model_path, config.feature_count)
        .with_context(|| format!("Failed to load model {}", config.model_path.display()))?;

    // Trap vectors are drawn once; a missing random source is fatal
    let registry = HoneypotRegistry::generate(
        config.honeypot_fields.clone(),
        config.honeypot_vectors,
        config.feature_count,
    )
    .context("Failed to generate honeypot registry")?;

    let state = AppState::new(config.clone(), registry, Arc::new(model));

    spawn_limiter_sweeper(Arc::clone(&state.default_limiter));
    spawn_limiter_sweeper(Arc::clone(&state.predict_limiter));

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AdmissionGate>,
    pub model: Arc<LoadedModel>,
    pub default_limiter: Arc<RateLimiter>,
    pub predict_limiter: Arc<RateLimiter>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(config: config::Config, registry: HoneypotRegistry, model: Arc<LoadedModel>) -> Self {
        let classifier: Arc<dyn Classifier> = model.clone();
        let gate = AdmissionGate::new(
            config.gate_config(),
            registry,
            SuspicionStore::new(config.suspicion_shards),
            classifier,
        );

        Self {
            gate: Arc::new(gate),
            model,
            default_limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_default_per_minute)),
            predict_limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_predict_per_minute)),
            config,
        }
    }
}

/// Periodically forget clients whose window has emptied
fn spawn_limiter_sweeper(limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            let removed = limiter.sweep();
            if removed > 0 {
                tracing::debug!("Rate limiter sweep removed {} idle clients", removed);
            }
        }
    });
}

/// Initialize logging from `RUST_LOG` and `LOG_FORMAT` (json for structured output)
fn init_tracing() {
    let json_logs = json_log_format();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "honeygate_server=debug,honeygate_core=info,deception=info,tower_http=debug".into()
        }))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();
}

fn json_log_format() -> bool {
    std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"))
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let identity_policy = IdentityPolicy {
        trust_forwarded_for: state.config.trust_forwarded_for,
    };

    // Prediction route (own quota)
    let predict_routes = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state.predict_limiter),
            middleware::rate_limit::enforce,
        ));

    // Everything else (default quota)
    let default_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state.default_limiter),
            middleware::rate_limit::enforce,
        ));

    // Combine all routes
    Router::new()
        .merge(predict_routes)
        .merge(default_routes)
        .layer(axum_middleware::from_fn_with_state(
            identity_policy,
            middleware::identity::identify_client,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
