//! Feature Vector - Validated classifier input
//!
//! Payloads arrive as arbitrary JSON. A vector is only constructed after
//! the arity and element types have been checked, so every `FeatureVector`
//! in the system has exactly the width the classifier was loaded with.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Why a `features` field could not be turned into a vector.
///
/// The messages are returned to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("Missing 'features' in request data")]
    Missing,

    #[error("Invalid feature format: expected an array of numbers")]
    NotAnArray,

    #[error("Invalid feature format: expected {expected} features, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("Invalid feature format: element {index} is not a number")]
    NotNumeric { index: usize },
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Fixed-width numeric feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector {
    values: Vec<f64>,
}

impl FeatureVector {
    /// Parse a JSON value into a vector of exactly `width` numbers.
    pub fn parse(value: &Value, width: usize) -> Result<Self, FeatureError> {
        let items = value.as_array().ok_or(FeatureError::NotAnArray)?;

        if items.len() != width {
            return Err(FeatureError::WrongLength {
                expected: width,
                actual: items.len(),
            });
        }

        let values = items
            .iter()
            .enumerate()
            .map(|(index, item)| item.as_f64().ok_or(FeatureError::NotNumeric { index }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { values })
    }

    /// Parse the `features` field out of a payload object.
    pub fn from_payload(
        payload: &serde_json::Map<String, Value>,
        width: usize,
    ) -> Result<Self, FeatureError> {
        let raw = payload
            .get(crate::constants::FEATURES_FIELD)
            .ok_or(FeatureError::Missing)?;
        Self::parse(raw, width)
    }

    /// Wrap already-validated values (trap vectors, tests).
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Single-precision copy for tensor inputs
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|v| *v as f32).collect()
    }
}
