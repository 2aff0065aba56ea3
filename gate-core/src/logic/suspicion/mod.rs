//! Suspicion Module - Per-client suspicion accounting

pub mod store;

pub use store::{SuspicionRecord, SuspicionStore};
