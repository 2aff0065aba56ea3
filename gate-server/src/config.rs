//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use honeygate_core::constants::{
    DEFAULT_FEATURE_COUNT, DEFAULT_SUSPICION_SHARDS, DEFAULT_SUSPICION_THRESHOLD,
    DEFAULT_TRAP_FIELDS, DEFAULT_TRAP_VECTOR_COUNT,
};
use honeygate_core::GateConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Classifier model file (.onnx or .json)
    pub model_path: PathBuf,

    /// Width of the feature vector
    pub feature_count: usize,

    /// Suspicion count above which a client is denied
    pub suspicion_threshold: u64,

    /// Reserved payload keys
    pub honeypot_fields: Vec<String>,

    /// Number of trap vectors generated at startup
    pub honeypot_vectors: usize,

    /// Suspicion store lock shards
    pub suspicion_shards: usize,

    /// Per-client requests per minute on routes other than /predict (0 = unlimited)
    pub rate_limit_default_per_minute: u32,

    /// Per-client requests per minute on /predict (0 = unlimited)
    pub rate_limit_predict_per_minute: u32,

    /// Use the first X-Forwarded-For entry as the client identity
    pub trust_forwarded_for: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 5000),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("fraud_detection.onnx")),

            feature_count: env_or("FEATURE_COUNT", DEFAULT_FEATURE_COUNT),

            suspicion_threshold: env_or("SUSPICION_THRESHOLD", DEFAULT_SUSPICION_THRESHOLD),

            honeypot_fields: env::var("HONEYPOT_FIELDS")
                .map(|raw| parse_field_list(&raw))
                .unwrap_or_else(|_| DEFAULT_TRAP_FIELDS.iter().map(|f| f.to_string()).collect()),

            honeypot_vectors: env_or("HONEYPOT_VECTORS", DEFAULT_TRAP_VECTOR_COUNT),

            suspicion_shards: env_or("SUSPICION_SHARDS", DEFAULT_SUSPICION_SHARDS),

            rate_limit_default_per_minute: env_or("RATE_LIMIT_DEFAULT_PER_MINUTE", 10),

            rate_limit_predict_per_minute: env_or("RATE_LIMIT_PREDICT_PER_MINUTE", 5),

            trust_forwarded_for: env::var("TRUST_FORWARDED_FOR")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Gate settings derived from this configuration
    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            feature_count: self.feature_count,
            suspicion_threshold: self.suspicion_threshold,
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            model_path: PathBuf::from("fraud_detection.onnx"),
            feature_count: DEFAULT_FEATURE_COUNT,
            suspicion_threshold: DEFAULT_SUSPICION_THRESHOLD,
            honeypot_fields: DEFAULT_TRAP_FIELDS.iter().map(|f| f.to_string()).collect(),
            honeypot_vectors: DEFAULT_TRAP_VECTOR_COUNT,
            suspicion_shards: DEFAULT_SUSPICION_SHARDS,
            rate_limit_default_per_minute: 10,
            rate_limit_predict_per_minute: 5,
            trust_forwarded_for: false,
            environment: "development".to_string(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Comma-separated list, blanks dropped
fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
