//! HoneyGate Core
//!
//! Admission gate that sits in front of a binary fraud classifier and decides,
//! per request, whether to forward the payload or reject it as suspicious.
//!
//! # Pipeline
//!
//! ```text
//! payload ──► structure ──► honeypot traps ──► suspicion threshold ──► classifier
//!                │                │                    │                    │
//!                ▼                ▼                    ▼                    ▼
//!          DenyMalformed    DenyHoneypot (+1)   DenyRepeatedSuspicion   Allow (+1 if benign)
//! ```

pub mod constants;
pub mod logic;

pub use logic::features::{ClientIdentity, FeatureError, FeatureVector};
pub use logic::gate::{AdmissionGate, GateConfig, GateDecision, GateError};
pub use logic::honeypot::{HoneypotRegistry, RegistryError};
pub use logic::model::{load_classifier, Classifier, ClassifierError, Label};
pub use logic::suspicion::SuspicionStore;
