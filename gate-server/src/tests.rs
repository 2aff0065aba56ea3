//! Router tests
//!
//! Requests go through the full router (identity, rate limiter, gate)
//! with a fixed-output linear model standing in for the classifier.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header::RETRY_AFTER, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use honeygate_core::constants::{DEFAULT_FEATURE_COUNT, DEFAULT_TRAP_FIELDS};
use honeygate_core::logic::model::{LinearClassifier, LoadedModel};
use honeygate_core::HoneypotRegistry;

use crate::config::Config;
use crate::error::SUSPICIOUS_ACTIVITY_MESSAGE;
use crate::{create_router, AppState};

const WIDTH: usize = 4;

fn test_state(bias: f64, predict_per_minute: u32) -> AppState {
    let config = Config {
        feature_count: WIDTH,
        rate_limit_predict_per_minute: predict_per_minute,
        ..Config::default()
    };
    // Zero weights: the bias alone decides the label
    let model = LoadedModel::new(Box::new(LinearClassifier::new(vec![0.0; WIDTH], bias)), "test.json");
    let registry = HoneypotRegistry::with_seed(DEFAULT_TRAP_FIELDS, 5, WIDTH, 11);

    AppState::new(config, registry, Arc::new(model))
}

fn benign_app(predict_per_minute: u32) -> (AppState, Router) {
    let state = test_state(-10.0, predict_per_minute);
    (state.clone(), create_router(state))
}

async fn post_predict(app: &Router, peer: &str, body: String) -> (StatusCode, Option<String>, Value) {
    let mut req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, retry_after, json)
}

fn valid_body() -> String {
    json!({"features": [0.1, 0.2, 0.3, 0.4]}).to_string()
}

#[tokio::test]
async fn test_four_benign_then_denied() {
    let (state, app) = benign_app(100);

    for _ in 0..4 {
        let (status, _, body) = post_predict(&app, "1.2.3.4:40000", valid_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"fraud_prediction": 0}));
    }

    let (status, _, body) = post_predict(&app, "1.2.3.4:40001", valid_body()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], SUSPICIOUS_ACTIVITY_MESSAGE);

    assert_eq!(state.gate.store().peek(&"1.2.3.4".into()), 4);
    assert_eq!(state.model.status().inference_count, 4);
}

#[tokio::test]
async fn test_fraud_prediction_returned() {
    let state = test_state(10.0, 100);
    let app = create_router(state.clone());

    let (status, _, body) = post_predict(&app, "5.5.5.5:1000", valid_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"fraud_prediction": 1}));
    assert_eq!(state.gate.store().peek(&"5.5.5.5".into()), 0);
}

#[tokio::test]
async fn test_security_denials_are_indistinguishable() {
    let (state, app) = benign_app(100);

    let trap_body = json!({"features": [0.1, 0.2, 0.3, 0.4], "honeypot1": 1}).to_string();
    let honeypot = post_predict(&app, "6.6.6.6:1000", trap_body).await;

    for _ in 0..4 {
        post_predict(&app, "7.7.7.7:1000", valid_body()).await;
    }
    let repeated = post_predict(&app, "7.7.7.7:1000", valid_body()).await;

    assert_eq!(honeypot.0, StatusCode::FORBIDDEN);
    assert_eq!(honeypot, repeated);
    assert_eq!(state.gate.store().peek(&"6.6.6.6".into()), 1);
}

#[tokio::test]
async fn test_trap_vector_is_denied() {
    let (state, app) = benign_app(100);
    let trap = state.gate.registry().trap_vectors()[0].clone();

    let body = json!({"features": trap.as_slice()}).to_string();
    let (status, _, _) = post_predict(&app, "8.8.8.8:1000", body).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(state.gate.store().peek(&"8.8.8.8".into()), 1);
}

#[tokio::test]
async fn test_full_width_trap_vectors_are_denied() {
    let width = DEFAULT_FEATURE_COUNT;
    let config = Config {
        feature_count: width,
        rate_limit_predict_per_minute: 100,
        ..Config::default()
    };
    let model = LoadedModel::new(Box::new(LinearClassifier::new(vec![0.0; width], -10.0)), "test.json");
    let registry = HoneypotRegistry::with_seed(DEFAULT_TRAP_FIELDS, 5, width, 2024);
    let state = AppState::new(config, registry, Arc::new(model));
    let app = create_router(state.clone());

    let traps = state.gate.registry().trap_vectors().to_vec();
    for (i, trap) in traps.iter().enumerate() {
        let peer = format!("10.0.0.{}:1000", i + 1);
        let body = json!({"features": trap.as_slice()}).to_string();
        let (status, _, _) = post_predict(&app, &peer, body).await;

        assert_eq!(status, StatusCode::FORBIDDEN, "trap vector {i}");
        assert_eq!(state.gate.store().peek(&format!("10.0.0.{}", i + 1).into()), 1);
    }
}

#[tokio::test]
async fn test_malformed_payloads_are_bad_requests() {
    let (state, app) = benign_app(100);

    let cases = [
        (json!({"amount": 1}).to_string(), "Missing 'features' in request data"),
        (json!({"features": [1, 2]}).to_string(), "expected 4 features, got 2"),
        (json!({"features": [1, "x", 3, 4]}).to_string(), "element 1 is not a number"),
        ("{not json".to_string(), "Invalid JSON body"),
    ];

    for (body, reason) in cases {
        let (status, _, json) = post_predict(&app, "2.2.2.2:1000", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(
            json["error"].as_str().unwrap().contains(reason),
            "expected '{reason}' in {json}"
        );
        assert_eq!(json["status"], 400);
    }

    assert_eq!(state.gate.store().tracked_identities(), 0);
    assert_eq!(state.model.status().inference_count, 0);
}

#[tokio::test]
async fn test_rate_limiter_runs_before_gate() {
    let (state, app) = benign_app(2);

    for _ in 0..2 {
        let (status, _, _) = post_predict(&app, "3.3.3.3:1000", valid_body()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let trap_body = json!({"features": [0.1, 0.2, 0.3, 0.4], "trap_feature": true}).to_string();
    let (status, retry_after, body) = post_predict(&app, "3.3.3.3:1000", trap_body).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["status"], 429);
    let retry: u64 = retry_after.unwrap().parse().unwrap();
    assert!((1..=60).contains(&retry));

    // Limited request never reached the gate
    assert_eq!(state.gate.store().peek(&"3.3.3.3".into()), 2);

    // Other clients keep their own quota
    let (status, _, _) = post_predict(&app, "3.3.3.4:1000", valid_body()).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_reports_state() {
    let (_, app) = benign_app(100);
    post_predict(&app, "4.4.4.4:1000", valid_body()).await;

    let mut req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    req.extensions_mut()
        .insert(ConnectInfo("4.4.4.4:1000".parse::<SocketAddr>().unwrap()));
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tracked_identities"], 1);
    assert_eq!(body["model"]["model_type"], "linear");
    assert_eq!(body["model"]["inference_count"], 1);
    assert_eq!(body["suspicion_threshold"], 3);
    assert_eq!(body["trap_fields"], DEFAULT_TRAP_FIELDS.len());
}

#[tokio::test]
async fn test_forwarded_for_identity_when_trusted() {
    let mut state = test_state(-10.0, 100);
    state.config.trust_forwarded_for = true;
    let app = create_router(state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("X-Forwarded-For", "203.0.113.9, 10.0.0.1")
        .body(Body::from(valid_body()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.gate.store().peek(&"203.0.113.9".into()), 1);
}

#[test]
fn test_env_file_drives_log_format() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, "LOG_FORMAT=json\n").unwrap();

    assert!(!crate::json_log_format());
    dotenvy::from_path(&env_file).unwrap();
    assert!(crate::json_log_format());

    std::env::remove_var("LOG_FORMAT");
}
