//! Gate Module - Admission decisions
//!
//! Structure check, honeypot traps and the suspicion threshold run before
//! the classifier; classifier outcomes feed back into the suspicion store.

pub mod engine;
pub mod types;


pub use engine::AdmissionGate;
pub use types::{GateConfig, GateDecision, GateError};
