//! ONNX Classifier - ONNX Runtime back-end
//!
//! Runs an exported tree-ensemble or linear model. Exports from the usual
//! converters produce an int64 `label` output next to a float
//! `probabilities` output; the label is used when present, otherwise the
//! first output is read as a label or a fraud probability.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::classifier::{check_width, Classifier, ClassifierError, Label};
use crate::logic::features::FeatureVector;

/// Output name used by common classifier exporters
const LABEL_OUTPUT: &str = "label";

/// Probability at or above which a float output means `Fraud`
const PROBABILITY_CUTOFF: f32 = 0.5;

pub struct OnnxClassifier {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    output_name: String,
    feature_count: usize,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn from_file(path: &Path, feature_count: usize) -> Result<Self, ClassifierError> {
        log::info!("Loading ONNX model from: {}", path.display());

        if !path.exists() {
            return Err(ClassifierError::ModelLoad(format!(
                "Model not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| ClassifierError::ModelLoad(format!("Failed to load model: {}", e)))?;

        Self::from_session(session, feature_count)
    }

    fn from_session(session: Session, feature_count: usize) -> Result<Self, ClassifierError> {
        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == LABEL_OUTPUT)
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| ClassifierError::ModelLoad("No output defined".to_string()))?;

        log::info!("ONNX model loaded, reading output '{}'", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            feature_count,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<Label, ClassifierError> {
        check_width(features, self.feature_count)?;

        let input_array = Array2::<f32>::from_shape_vec((1, self.feature_count), features.to_f32())
            .map_err(|e| ClassifierError::InvalidInput(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| ClassifierError::InvalidInput(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ClassifierError::Unavailable(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| ClassifierError::Unavailable("No output".to_string()))?;

        if let Ok(labels) = output.try_extract_tensor::<i64>() {
            let class = labels
                .1
                .first()
                .copied()
                .ok_or_else(|| ClassifierError::Unavailable("Empty label output".to_string()))?;
            return Ok(Label::from_class(class));
        }

        let scores = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Unavailable(format!("Extract error: {}", e)))?
            .1;

        // [p_fraud] or [p_benign, p_fraud]
        let fraud_probability = match scores {
            [p] => *p,
            [_, p, ..] => *p,
            [] => return Err(ClassifierError::Unavailable("Empty score output".to_string())),
        };

        Ok(if fraud_probability >= PROBABILITY_CUTOFF {
            Label::Fraud
        } else {
            Label::Benign
        })
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
