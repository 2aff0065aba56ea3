//! Linear Classifier - Logistic regression from a JSON file
//!
//! Lightweight back-end for deployments without ONNX Runtime. The file
//! holds one weight per feature:
//!
//! ```json
//! { "weights": [0.1, -0.4, ...], "bias": -1.2, "threshold": 0.5 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::classifier::{check_width, Classifier, ClassifierError, Label};
use crate::logic::features::FeatureVector;

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub bias: f64,
    /// Probability at or above which the label is `Fraud`
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LinearClassifier {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            weights,
            bias,
            threshold: default_threshold(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ClassifierError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let model: Self = serde_json::from_str(&raw)
            .map_err(|e| ClassifierError::ModelLoad(format!("{}: {}", path.display(), e)))?;

        if model.weights.is_empty() {
            return Err(ClassifierError::ModelLoad(format!(
                "{}: model has no weights",
                path.display()
            )));
        }

        Ok(model)
    }

    /// Fraud probability for a vector of the right width
    pub fn probability(&self, features: &FeatureVector) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(features.as_slice())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias;

        1.0 / (1.0 + (-z).exp())
    }
}

impl Classifier for LinearClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<Label, ClassifierError> {
        check_width(features, self.weights.len())?;

        let p = self.probability(features);
        if !p.is_finite() {
            return Err(ClassifierError::InvalidInput("non-finite score".to_string()));
        }

        Ok(if p >= self.threshold { Label::Fraud } else { Label::Benign })
    }

    fn feature_count(&self) -> usize {
        self.weights.len()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}
