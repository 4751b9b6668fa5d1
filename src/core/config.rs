//! Model configuration and the tensor shape contract.
//!
//! This module provides the configuration for locating and naming the trained
//! classifier, plus the shape types used to validate a loaded model's
//! declared input/output tensors against the canonical contract.
//!
//! # Shape Representation
//!
//! ONNX models declare tensor shapes as lists of dimensions where:
//! - Positive values indicate fixed dimensions
//! - Negative values indicate dynamic dimensions
//!
//! The canonical classifier contract is `[N, 200, 200, 1]` in and `[N, 6]`
//! out, where the batch dimension `N` may be fixed or dynamic.

use crate::core::constants::{DEFAULT_MODEL_PATH, MODEL_PATH_ENV};
use crate::core::errors::{InspectError, InspectResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Represents a dimension that can be fixed or dynamic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    /// Fixed dimension with a specific value
    Fixed(i64),
    /// Dynamic dimension (represented as -1 in ONNX)
    Dynamic,
}

impl Dim {
    /// Returns true if this dimension is dynamic.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Dim::Dynamic)
    }

    /// Returns the fixed value if this dimension is fixed, None otherwise.
    pub fn value(&self) -> Option<i64> {
        match self {
            Dim::Fixed(v) => Some(*v),
            Dim::Dynamic => None,
        }
    }

    /// Returns true if a declared dimension satisfies this contract dimension.
    ///
    /// A dynamic contract dimension accepts anything; a fixed contract
    /// dimension requires the declared value to match exactly. A model
    /// declaring a dynamic dimension where the contract is fixed is rejected:
    /// the contract guarantees bit-exact tensor shapes, and a dynamic
    /// declaration gives no such guarantee.
    pub fn accepts(&self, declared: Dim) -> bool {
        match self {
            Dim::Dynamic => true,
            Dim::Fixed(expected) => declared.value() == Some(*expected),
        }
    }
}

impl From<i64> for Dim {
    fn from(value: i64) -> Self {
        if value < 0 { Dim::Dynamic } else { Dim::Fixed(value) }
    }
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dim::Fixed(v) => write!(f, "{}", v),
            Dim::Dynamic => write!(f, "-1"),
        }
    }
}

/// A tensor shape specification with support for dynamic dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorShape {
    dims: Vec<Dim>,
}

impl TensorShape {
    /// Creates a tensor shape from explicit dimensions.
    pub fn new(dims: Vec<Dim>) -> Self {
        Self { dims }
    }

    /// Parses a shape from ONNX model dimensions.
    ///
    /// Values < 0 are treated as dynamic dimensions.
    pub fn from_onnx_dims(dims: &[i64]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Dim::from(d)).collect(),
        }
    }

    /// The canonical classifier input shape: `[N, 200, 200, 1]` (NHWC).
    pub fn input_contract() -> Self {
        use crate::core::constants::IMG_SIZE;
        Self::new(vec![
            Dim::Dynamic,
            Dim::Fixed(IMG_SIZE as i64),
            Dim::Fixed(IMG_SIZE as i64),
            Dim::Fixed(1),
        ])
    }

    /// The canonical classifier output shape: `[N, 6]`.
    pub fn output_contract() -> Self {
        use crate::core::constants::NUM_CLASSES;
        Self::new(vec![Dim::Dynamic, Dim::Fixed(NUM_CLASSES as i64)])
    }

    /// Returns the number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Returns the dimensions of this shape.
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Checks a declared shape against this contract shape.
    ///
    /// Rank must match and every contract dimension must accept the declared
    /// dimension (see [`Dim::accepts`]).
    pub fn accepts(&self, declared: &TensorShape) -> bool {
        self.rank() == declared.rank()
            && self
                .dims
                .iter()
                .zip(declared.dims.iter())
                .all(|(contract, decl)| contract.accepts(*decl))
    }
}

impl std::fmt::Display for TensorShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", dim)?;
        }
        write!(f, "]")
    }
}

/// Configuration for the trained classifier model.
///
/// The model file is optional at runtime: a missing or unreadable file forces
/// the deterministic fallback classifier rather than failing the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX model file.
    pub model_path: PathBuf,
    /// Name used for the model in logs and error messages.
    pub model_name: String,
    /// Input tensor name. Discovered from the session when `None`.
    pub input_name: Option<String>,
    /// Output tensor name. Discovered from the session when `None`.
    pub output_name: Option<String>,
}

impl ModelConfig {
    /// Creates a configuration for a model at the given path.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            model_name: "neu_cnn".to_string(),
            input_name: None,
            output_name: None,
        }
    }

    /// Creates a configuration from the environment.
    ///
    /// Honors the `MODEL_PATH` environment variable, falling back to the
    /// default model location when unset.
    pub fn from_env() -> Self {
        let path = std::env::var(MODEL_PATH_ENV).unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        Self::new(path)
    }

    /// Sets the model name used in logs and error messages.
    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> InspectResult<()> {
        if self.model_name.is_empty() {
            return Err(InspectError::config_error("model_name must not be empty"));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(InspectError::config_error("model_path must not be empty"));
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dim_from_i64() {
        assert_eq!(Dim::from(200), Dim::Fixed(200));
        assert_eq!(Dim::from(-1), Dim::Dynamic);
        assert_eq!(Dim::from(0), Dim::Fixed(0));
    }

    #[test]
    fn test_dim_accepts() {
        assert!(Dim::Dynamic.accepts(Dim::Fixed(7)));
        assert!(Dim::Dynamic.accepts(Dim::Dynamic));
        assert!(Dim::Fixed(200).accepts(Dim::Fixed(200)));
        assert!(!Dim::Fixed(200).accepts(Dim::Fixed(224)));
        // A dynamic declaration cannot satisfy a fixed contract dimension.
        assert!(!Dim::Fixed(200).accepts(Dim::Dynamic));
    }

    #[test]
    fn test_input_contract_accepts_dynamic_batch() {
        let contract = TensorShape::input_contract();
        assert!(contract.accepts(&TensorShape::from_onnx_dims(&[-1, 200, 200, 1])));
        assert!(contract.accepts(&TensorShape::from_onnx_dims(&[1, 200, 200, 1])));
    }

    #[test]
    fn test_input_contract_rejects_foreign_shapes() {
        let contract = TensorShape::input_contract();
        // 224x224 RGB, the classic transfer-learning input
        assert!(!contract.accepts(&TensorShape::from_onnx_dims(&[-1, 224, 224, 3])));
        // NCHW layout with the right numbers in the wrong places
        assert!(!contract.accepts(&TensorShape::from_onnx_dims(&[-1, 1, 200, 200])));
        // missing channel axis
        assert!(!contract.accepts(&TensorShape::from_onnx_dims(&[-1, 200, 200])));
    }

    #[test]
    fn test_output_contract() {
        let contract = TensorShape::output_contract();
        assert!(contract.accepts(&TensorShape::from_onnx_dims(&[-1, 6])));
        assert!(contract.accepts(&TensorShape::from_onnx_dims(&[1, 6])));
        assert!(!contract.accepts(&TensorShape::from_onnx_dims(&[-1, 4])));
    }

    #[test]
    fn test_shape_display() {
        let shape = TensorShape::from_onnx_dims(&[-1, 200, 200, 1]);
        assert_eq!(format!("{}", shape), "[-1, 200, 200, 1]");
    }

    #[test]
    fn test_model_config_validate() {
        assert!(ModelConfig::default().validate().is_ok());
        assert!(ModelConfig::new("").validate().is_err());

        let mut config = ModelConfig::default();
        config.model_name = String::new();
        assert!(config.validate().is_err());
    }
}
