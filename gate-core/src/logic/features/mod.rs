//! Features Module - Untrusted payload parsing
//!
//! Turns the `features` field of a request payload into a validated,
//! fixed-width vector, and defines the opaque client identity key.

pub mod identity;
pub mod vector;

pub use identity::ClientIdentity;
pub use vector::{FeatureError, FeatureVector};
