//! Central Configuration Constants
//!
//! Single source of truth for gate defaults. The server reads overrides
//! from the environment and falls back to these values.

/// Width of the feature vector the classifier expects
pub const DEFAULT_FEATURE_COUNT: usize = 30;

/// Suspicion count above which an identity is denied outright
pub const DEFAULT_SUSPICION_THRESHOLD: u64 = 3;

/// Number of synthetic trap vectors generated at startup
pub const DEFAULT_TRAP_VECTOR_COUNT: usize = 5;

/// Number of independently locked suspicion store shards
pub const DEFAULT_SUSPICION_SHARDS: usize = 16;

/// Reserved payload keys that no legitimate client sends
pub const DEFAULT_TRAP_FIELDS: [&str; 4] = ["honeypot1", "honeypot2", "trap_feature", "hidden_flag"];

/// Name of the payload field carrying the feature vector
pub const FEATURES_FIELD: &str = "features";

/// Log target for trap hits and suspicion blocks
pub const DECEPTION_LOG_TARGET: &str = "deception";
