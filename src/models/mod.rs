//! Classifier implementations and the model adapter.
//!
//! The adapter presents one uniform `predict` interface over either a
//! trained ONNX model or the deterministic fallback classifier, and owns the
//! loaded/unloaded lifecycle.

pub mod adapter;
pub mod fallback;
pub mod ort_classifier;

pub use adapter::{ModelAdapter, ModelSource};
pub use fallback::FallbackClassifier;
pub use ort_classifier::OnnxClassifier;
