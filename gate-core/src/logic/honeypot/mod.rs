//! Honeypot Module - Trap signatures
//!
//! Reserved field names and synthetic feature vectors that a legitimate
//! client never sends. Built once at startup, read-only afterwards.

pub mod registry;

pub use registry::{HoneypotRegistry, RegistryError};
