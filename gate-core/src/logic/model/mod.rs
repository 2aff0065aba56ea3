//! Model Module - Classifier behind the gate
//!
//! The gate only sees the `Classifier` trait. Back-ends are picked from the
//! model file extension at load time, so the model can be swapped without
//! touching the decision logic.

pub mod classifier;
pub mod linear;
pub mod loader;
pub mod onnx;

// Re-export common types
pub use classifier::{Classifier, ClassifierError, Label};
pub use linear::LinearClassifier;
pub use loader::{load_classifier, LoadedModel, ModelMetadata, ModelStatus};
pub use onnx::OnnxClassifier;
