//! ONNX Runtime classifier.
//!
//! Wraps an `ort` session around a trained surface-defect model and checks
//! the model's declared tensor shapes against the canonical contract once at
//! load time. A mis-shaped model is rejected there and then; it is never
//! allowed to produce silently wrong predictions per request.

use crate::core::config::{ModelConfig, TensorShape};
use crate::core::errors::{InspectError, InspectResult};
use crate::core::{Tensor2D, Tensor4D};
use crate::domain::{ClassProbabilities, NormalizedView};
use ndarray::{ArrayView2, Axis};
use ort::session::Session;
use ort::value::{TensorRef, ValueType};
use std::path::PathBuf;
use std::sync::Mutex;

/// Inference engine for a loaded ONNX surface-defect model.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    model_name: String,
    model_path: PathBuf,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("model_name", &self.model_name)
            .field("model_path", &self.model_path)
            .finish()
    }
}

impl OnnxClassifier {
    /// Loads a model and validates it against the canonical contract.
    ///
    /// # Errors
    ///
    /// * [`InspectError::ModelLoad`] - the file is missing or the session
    ///   could not be created; callers treat this as non-fatal.
    /// * [`InspectError::ShapeContract`] - the model loaded but declares
    ///   input/output shapes other than `[N, 200, 200, 1]` / `[N, 6]`.
    pub fn load(config: &ModelConfig) -> InspectResult<Self> {
        config.validate()?;
        let path = &config.model_path;

        if !path.exists() {
            return Err(InspectError::model_load(
                path,
                "model file not found",
                None::<std::io::Error>,
            ));
        }

        let session = Session::builder()
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| InspectError::model_load(path, "failed to create ONNX session", Some(e)))?;

        let (input_name, input_shape) = declared_input(&session, path)?;
        let (output_name, output_shape) = declared_output(&session, path)?;
        Self::validate_contract(&input_shape, &output_shape)?;

        tracing::info!(
            model = %config.model_name,
            path = %path.display(),
            input = %input_shape,
            output = %output_shape,
            "ONNX model loaded and shape contract validated"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name: config.input_name.clone().unwrap_or(input_name),
            output_name: config.output_name.clone().unwrap_or(output_name),
            model_name: config.model_name.clone(),
            model_path: path.clone(),
        })
    }

    /// Checks declared model shapes against the canonical contract.
    ///
    /// The input must be `[N, 200, 200, 1]` and the output `[N, 6]`, where
    /// the batch dimension may be fixed or dynamic. Everything else is a
    /// contract violation.
    pub fn validate_contract(input: &TensorShape, output: &TensorShape) -> InspectResult<()> {
        let input_contract = TensorShape::input_contract();
        if !input_contract.accepts(input) {
            return Err(InspectError::shape_contract("input", input_contract, input));
        }
        let output_contract = TensorShape::output_contract();
        if !output_contract.accepts(output) {
            return Err(InspectError::shape_contract(
                "output",
                output_contract,
                output,
            ));
        }
        Ok(())
    }

    /// Returns the model name associated with this classifier.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model path associated with this classifier.
    pub fn model_path(&self) -> &std::path::Path {
        &self.model_path
    }

    /// Runs the model on a batch of normalized views.
    ///
    /// Input is NHWC `[N, 200, 200, 1]`; output is `[N, 6]`.
    pub fn predict_batch(&self, x: &Tensor4D) -> InspectResult<Tensor2D> {
        let batch_size = x.shape()[0];

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            InspectError::inference(
                &self.model_name,
                format!("failed to convert input tensor with shape {:?}", x.shape()),
                e,
            )
        })?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let mut session = self.session.lock().map_err(|_| {
            InspectError::config_error(format!(
                "session lock poisoned for model '{}'",
                self.model_name
            ))
        })?;

        let outputs = session.run(inputs).map_err(|e| {
            InspectError::inference(
                &self.model_name,
                format!(
                    "forward pass failed with input '{}' -> output '{}'",
                    self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                InspectError::inference(
                    &self.model_name,
                    format!("failed to extract output tensor '{}' as f32", self.output_name),
                    e,
                )
            })?;

        Self::output_matrix(&self.model_name, output_shape, output_data, batch_size)
    }

    /// Reshapes extracted output data into a `[N, classes]` matrix.
    ///
    /// The declared output shape is validated at load time, but the tensor
    /// actually produced by a run is checked here: anything other than a
    /// rank-2 tensor covering the full batch is rejected.
    fn output_matrix(
        model_name: &str,
        output_shape: &[i64],
        output_data: &[f32],
        batch_size: usize,
    ) -> InspectResult<Tensor2D> {
        if output_shape.len() != 2 {
            return Err(InspectError::ShapeContract {
                message: format!(
                    "model '{model_name}' returned a rank-{} output tensor, expected rank 2 [N, classes]",
                    output_shape.len()
                ),
            });
        }
        let num_classes = output_shape[1] as usize;
        let expected_len = batch_size * num_classes;
        if output_data.len() != expected_len {
            return Err(InspectError::ShapeContract {
                message: format!(
                    "model '{model_name}' returned {} output values for a batch of {batch_size}, expected {expected_len}",
                    output_data.len()
                ),
            });
        }

        let view = ArrayView2::from_shape((batch_size, num_classes), output_data)
            .map_err(InspectError::Tensor)?;
        Ok(view.to_owned())
    }

    /// Classifies a single normalized view.
    pub fn predict(&self, view: &NormalizedView) -> InspectResult<ClassProbabilities> {
        let batched = view.as_array().clone().insert_axis(Axis(0));
        let output = self.predict_batch(&batched)?;
        let scores: Vec<f32> = output.row(0).to_vec();
        ClassProbabilities::from_scores(&scores)
    }
}

/// Reads the name and declared shape of the model's primary input.
fn declared_input(session: &Session, path: &std::path::Path) -> InspectResult<(String, TensorShape)> {
    let input = session.inputs.first().ok_or_else(|| {
        InspectError::model_load(path, "model declares no inputs", None::<std::io::Error>)
    })?;
    match &input.input_type {
        ValueType::Tensor { shape, .. } => {
            let dims: Vec<i64> = shape.iter().copied().collect();
            Ok((input.name.clone(), TensorShape::from_onnx_dims(&dims)))
        }
        other => Err(InspectError::ShapeContract {
            message: format!("model input '{}' is not a tensor: {other:?}", input.name),
        }),
    }
}

/// Reads the name and declared shape of the model's primary output.
fn declared_output(session: &Session, path: &std::path::Path) -> InspectResult<(String, TensorShape)> {
    let output = session.outputs.first().ok_or_else(|| {
        InspectError::model_load(path, "model declares no outputs", None::<std::io::Error>)
    })?;
    match &output.output_type {
        ValueType::Tensor { shape, .. } => {
            let dims: Vec<i64> = shape.iter().copied().collect();
            Ok((output.name.clone(), TensorShape::from_onnx_dims(&dims)))
        }
        other => Err(InspectError::ShapeContract {
            message: format!("model output '{}' is not a tensor: {other:?}", output.name),
        }),
    }
}
