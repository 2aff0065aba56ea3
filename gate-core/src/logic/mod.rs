//! Gate logic
//!
//! Leaves first: features and honeypot/suspicion state have no dependencies,
//! the model module wraps the classifier, and the gate ties them together.

pub mod features;
pub mod honeypot;
pub mod suspicion;
pub mod model;
pub mod gate;
