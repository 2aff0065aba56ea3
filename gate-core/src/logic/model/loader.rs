//! Model Loader
//!
//! Picks a back-end from the model file extension and wraps it with
//! latency/usage counters for the status endpoint.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ClassifierError, Label};
use super::linear::LinearClassifier;
use super::onnx::OnnxClassifier;
use crate::logic::features::FeatureVector;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub model_type: String,
    pub features: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

/// Model status for the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_path: String,
    pub model_type: String,
    pub features: usize,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
    pub failure_count: u64,
}

/// Loaded classifier with usage counters
pub struct LoadedModel {
    inner: Box<dyn Classifier>,
    metadata: ModelMetadata,
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
    failure_count: AtomicU64,
}

impl LoadedModel {
    pub fn new(inner: Box<dyn Classifier>, model_path: impl Into<String>) -> Self {
        let metadata = ModelMetadata {
            model_path: model_path.into(),
            model_type: inner.kind().to_string(),
            features: inner.feature_count(),
            loaded_at: chrono::Utc::now(),
        };

        Self {
            inner,
            metadata,
            latency_sum_us: AtomicU64::new(0),
            inference_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn status(&self) -> ModelStatus {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.inference_count.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        ModelStatus {
            model_path: self.metadata.model_path.clone(),
            model_type: self.metadata.model_type.clone(),
            features: self.metadata.features,
            loaded_at: self.metadata.loaded_at,
            avg_latency_ms: avg,
            inference_count: count,
            failure_count: self.failure_count.load(Ordering::Relaxed),
        }
    }
}

impl Classifier for LoadedModel {
    fn classify(&self, features: &FeatureVector) -> Result<Label, ClassifierError> {
        let start = Instant::now();
        let result = self.inner.classify(features);

        self.latency_sum_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        if result.is_err() {
            self.failure_count.fetch_add(1, Ordering::Relaxed);
        }

        result
    }

    fn feature_count(&self) -> usize {
        self.inner.feature_count()
    }

    fn kind(&self) -> &'static str {
        self.inner.kind()
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Load a classifier expecting `feature_count` inputs.
///
/// `.onnx` files go through ONNX Runtime, `.json` files are read as a
/// logistic model. A model whose width disagrees with `feature_count` is
/// rejected here rather than on the first request.
pub fn load_classifier(path: &Path, feature_count: usize) -> Result<LoadedModel, ClassifierError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let inner: Box<dyn Classifier> = match extension.as_deref() {
        Some("onnx") => Box::new(OnnxClassifier::from_file(path, feature_count)?),
        Some("json") => Box::new(LinearClassifier::from_file(path)?),
        _ => {
            return Err(ClassifierError::ModelLoad(format!(
                "Unsupported model format: {} (expected .onnx or .json)",
                path.display()
            )))
        }
    };

    if inner.feature_count() != feature_count {
        return Err(ClassifierError::ModelLoad(format!(
            "Model expects {} features but gate is configured for {}",
            inner.feature_count(),
            feature_count
        )));
    }

    log::info!(
        "Classifier loaded: {} ({}, {} features)",
        path.display(),
        inner.kind(),
        feature_count
    );

    Ok(LoadedModel::new(inner, path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn linear_model_file(width: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let model = LinearClassifier::new(vec![1.0; width], -0.5 * width as f64);
        write!(file, "{}", serde_json::to_string(&model).unwrap()).unwrap();
        file
    }

    #[test]
    fn test_load_json_model() {
        let file = linear_model_file(4);
        let model = load_classifier(file.path(), 4).unwrap();

        assert_eq!(model.kind(), "linear");
        assert_eq!(model.metadata().features, 4);

        let benign = FeatureVector::from_values(vec![0.0; 4]);
        assert_eq!(model.classify(&benign).unwrap(), Label::Benign);

        let status = model.status();
        assert_eq!(status.inference_count, 1);
        assert_eq!(status.failure_count, 0);
    }

    #[test]
    fn test_load_rejects_width_mismatch() {
        let file = linear_model_file(3);
        let err = load_classifier(file.path(), 30).err().unwrap();
        assert!(matches!(err, ClassifierError::ModelLoad(_)));
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let err = load_classifier(Path::new("fraud_detection.pkl"), 30).err().unwrap();
        assert!(err.to_string().contains("Unsupported model format"));
    }

    #[test]
    fn test_failures_are_counted() {
        let file = linear_model_file(2);
        let model = load_classifier(file.path(), 2).unwrap();

        assert!(model.classify(&FeatureVector::from_values(vec![1.0])).is_err());
        assert_eq!(model.status().failure_count, 1);
    }
}
