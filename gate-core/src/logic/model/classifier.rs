//! Classifier contract
//!
//! A fixed-width numeric vector in, a binary label out. Implementations are
//! read-only after construction and may be called from many threads.

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::logic::features::FeatureVector;

/// Binary classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Class 0: legitimate transaction
    Benign,
    /// Class 1: fraudulent transaction
    Fraud,
}

impl Label {
    pub fn as_u8(self) -> u8 {
        match self {
            Label::Benign => 0,
            Label::Fraud => 1,
        }
    }

    pub fn from_class(class: i64) -> Self {
        if class == 0 {
            Label::Benign
        } else {
            Label::Fraud
        }
    }

    pub fn is_benign(self) -> bool {
        self == Label::Benign
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

#[derive(Debug, Clone, Error)]
pub enum ClassifierError {
    /// The classifier refused the input (shape or value problem)
    #[error("Invalid classifier input: {0}")]
    InvalidInput(String),

    /// Inference could not run
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    /// The model file could not be loaded
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
}

/// Trait for inference back-ends (ONNX, linear, test doubles)
pub trait Classifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> Result<Label, ClassifierError>;

    /// Input width the model was built for
    fn feature_count(&self) -> usize;

    /// Short back-end name for status reporting
    fn kind(&self) -> &'static str;
}

/// Reject vectors whose width does not match the model
pub(crate) fn check_width(features: &FeatureVector, expected: usize) -> Result<(), ClassifierError> {
    if features.len() != expected {
        return Err(ClassifierError::InvalidInput(format!(
            "expected {} features, got {}",
            expected,
            features.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Label::Benign).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Label::Fraud).unwrap(), "1");
    }

    #[test]
    fn test_label_from_class() {
        assert_eq!(Label::from_class(0), Label::Benign);
        assert_eq!(Label::from_class(1), Label::Fraud);
        assert!(Label::Benign.is_benign());
        assert!(!Label::Fraud.is_benign());
    }
}
