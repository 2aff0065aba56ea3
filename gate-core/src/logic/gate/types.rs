//! Gate types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_FEATURE_COUNT, DEFAULT_SUSPICION_THRESHOLD};
use crate::logic::features::FeatureVector;
use crate::logic::model::{ClassifierError, Label};

/// Gate tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Width of every accepted feature vector
    pub feature_count: usize,

    /// Identities whose count is strictly above this are denied
    pub suspicion_threshold: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            feature_count: DEFAULT_FEATURE_COUNT,
            suspicion_threshold: DEFAULT_SUSPICION_THRESHOLD,
        }
    }
}

/// Outcome of one request. Exactly one is produced per request.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// Forwarded to the classifier
    Allow { features: FeatureVector, label: Label },

    /// Trap field or trap vector present
    DenyHoneypot,

    /// Identity's suspicion count is above the threshold
    DenyRepeatedSuspicion,

    /// Payload could not be turned into a feature vector
    DenyMalformed(String),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow { .. })
    }

    /// Honeypot or repeated-suspicion denial
    pub fn is_security_denial(&self) -> bool {
        matches!(self, GateDecision::DenyHoneypot | GateDecision::DenyRepeatedSuspicion)
    }

    pub fn label(&self) -> Option<Label> {
        match self {
            GateDecision::Allow { label, .. } => Some(*label),
            _ => None,
        }
    }

    /// Stable name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            GateDecision::Allow { .. } => "allow",
            GateDecision::DenyHoneypot => "deny_honeypot",
            GateDecision::DenyRepeatedSuspicion => "deny_repeated_suspicion",
            GateDecision::DenyMalformed(_) => "deny_malformed",
        }
    }
}

/// Failures the gate cannot turn into a decision
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}
