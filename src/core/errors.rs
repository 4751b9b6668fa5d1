//! Error types for the inspection pipeline.
//!
//! This module defines the error taxonomy of the pipeline along with helper
//! constructors for creating errors with appropriate context. Per-view
//! failures (`InvalidRaster`) are absorbed by the aggregator; whole-request
//! failures (`NoValidViews`, `ShapeContract`) propagate to the caller as
//! distinct kinds so a specific message can be rendered.

use std::path::Path;
use thiserror::Error;

/// Convenient result alias for inspection operations.
pub type InspectResult<T> = Result<T, InspectError>;

/// Enum representing the errors that can occur in the inspection pipeline.
#[derive(Error, Debug)]
pub enum InspectError {
    /// A view raster is malformed (for example zero width or height).
    ///
    /// Surfaced by the normalizer; the aggregator decides whether to skip
    /// the view or fail the request.
    #[error("invalid raster: {message}")]
    InvalidRaster {
        /// A message describing what is wrong with the raster.
        message: String,
    },

    /// No usable views remained after normalization; the piece cannot be
    /// scored with zero evidence. Fatal to the analysis request.
    #[error("no valid views for piece '{piece_id}'")]
    NoValidViews {
        /// Identifier of the piece being analyzed.
        piece_id: String,
    },

    /// The trained model failed to load. Non-fatal: the adapter falls back
    /// to the deterministic classifier.
    #[error("model load failed for '{path}': {message}")]
    ModelLoad {
        /// Path of the model file that failed to load.
        path: String,
        /// A message describing the failure.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A loaded model's declared tensor shapes disagree with the canonical
    /// contract. Fatal at load time; never coerced.
    #[error("shape contract violation: {message}")]
    ShapeContract {
        /// A message describing the expected and declared shapes.
        message: String,
    },

    /// Error occurred during inference against a loaded model.
    #[error("inference failed for model '{model_name}': {context}")]
    Inference {
        /// Name of the model that failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error occurred while loading or decoding an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),
}

impl InspectError {
    /// Creates an error for a malformed input raster.
    pub fn invalid_raster(message: impl Into<String>) -> Self {
        Self::InvalidRaster {
            message: message.into(),
        }
    }

    /// Creates an error for an analysis request with zero usable views.
    pub fn no_valid_views(piece_id: impl Into<String>) -> Self {
        Self::NoValidViews {
            piece_id: piece_id.into(),
        }
    }

    /// Creates a model load error with an optional underlying cause.
    pub fn model_load(
        path: &Path,
        message: impl Into<String>,
        source: Option<impl std::error::Error + Send + Sync + 'static>,
    ) -> Self {
        Self::ModelLoad {
            path: path.display().to_string(),
            message: message.into(),
            source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
        }
    }

    /// Creates a shape contract violation comparing declared and expected shapes.
    pub fn shape_contract(field: &str, expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> Self {
        Self::ShapeContract {
            message: format!("model {field} declared {actual}, contract requires {expected}"),
        }
    }

    /// Creates an inference error with context about the failing model.
    pub fn inference(
        model_name: &str,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Inference {
            model_name: model_name.to_string(),
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = InspectError::invalid_raster("zero-size raster (0x120)");
        assert!(err.to_string().contains("0x120"));

        let err = InspectError::no_valid_views("P1");
        assert!(err.to_string().contains("P1"));
    }

    #[test]
    fn test_shape_contract_message_names_both_shapes() {
        let err = InspectError::shape_contract("input", "[-1, 200, 200, 1]", "[-1, 224, 224, 3]");
        let msg = err.to_string();
        assert!(msg.contains("[-1, 224, 224, 3]"));
        assert!(msg.contains("[-1, 200, 200, 1]"));
    }

    #[test]
    fn test_model_load_without_source() {
        let err = InspectError::model_load(
            Path::new("models/missing.onnx"),
            "model file not found",
            None::<std::io::Error>,
        );
        assert!(err.to_string().contains("missing.onnx"));
    }
}
