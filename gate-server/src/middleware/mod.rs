//! Request middleware

pub mod identity;
pub mod rate_limit;
