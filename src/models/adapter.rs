//! The model adapter.
//!
//! Presents one uniform prediction interface over either a trained ONNX
//! model or the deterministic fallback classifier. The adapter owns the
//! loaded/unloaded lifecycle: the first load attempt resolves the state for
//! the process lifetime, and only an explicit [`ModelAdapter::reload`] can
//! change it afterwards (in either direction, for example when the model
//! file appears or becomes unreadable).
//!
//! The adapter instance is passed through the call chain rather than living
//! in a module-level global; predictions take a shared read lock while load
//! attempts are serialized behind the single write lock.

use crate::core::config::ModelConfig;
use crate::core::errors::{InspectError, InspectResult};
use crate::domain::{ClassProbabilities, NormalizedView};
use crate::models::fallback::FallbackClassifier;
use crate::models::ort_classifier::OnnxClassifier;
use std::sync::RwLock;

/// Which classifier currently backs the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    /// No load attempt has been made yet.
    Unloaded,
    /// The deterministic hash-based fallback classifier.
    Fallback,
    /// A validated trained model behind ONNX Runtime.
    Onnx,
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::Unloaded => f.write_str("unloaded"),
            ModelSource::Fallback => f.write_str("fallback"),
            ModelSource::Onnx => f.write_str("onnx"),
        }
    }
}

enum Backend {
    Fallback(FallbackClassifier),
    Onnx(OnnxClassifier),
}

/// Uniform classifier interface owning the model lifecycle.
pub struct ModelAdapter {
    config: ModelConfig,
    backend: RwLock<Option<Backend>>,
}

impl std::fmt::Debug for ModelAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelAdapter")
            .field("config", &self.config)
            .field("source", &self.source())
            .finish()
    }
}

impl ModelAdapter {
    /// Creates an adapter in the unloaded state.
    ///
    /// The first call to [`predict`](Self::predict) or
    /// [`reload`](Self::reload) attempts to load the configured model.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            backend: RwLock::new(None),
        }
    }

    /// Returns the model configuration.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Returns which classifier currently backs the adapter.
    pub fn source(&self) -> ModelSource {
        match self.backend.read() {
            Ok(guard) => match &*guard {
                None => ModelSource::Unloaded,
                Some(Backend::Fallback(_)) => ModelSource::Fallback,
                Some(Backend::Onnx(_)) => ModelSource::Onnx,
            },
            Err(_) => ModelSource::Unloaded,
        }
    }

    /// Re-attempts loading the configured model.
    ///
    /// A load failure (missing or unreadable file) is non-fatal: the adapter
    /// lands in fallback mode, the condition is logged at warn level, and
    /// `Ok(ModelSource::Fallback)` is returned. A shape contract violation
    /// also forces fallback mode but is surfaced as an error so the
    /// misconfiguration cannot go unnoticed.
    pub fn reload(&self) -> InspectResult<ModelSource> {
        self.install(OnnxClassifier::load(&self.config))
    }

    /// Resolves a load attempt into the adapter state.
    pub(crate) fn install(&self, result: InspectResult<OnnxClassifier>) -> InspectResult<ModelSource> {
        let mut guard = self
            .backend
            .write()
            .map_err(|_| InspectError::config_error("model state lock poisoned"))?;

        match result {
            Ok(classifier) => {
                *guard = Some(Backend::Onnx(classifier));
                Ok(ModelSource::Onnx)
            }
            Err(err @ InspectError::ShapeContract { .. }) => {
                tracing::error!(
                    model = %self.config.model_name,
                    error = %err,
                    "model rejected by shape contract; forcing fallback mode"
                );
                *guard = Some(Backend::Fallback(FallbackClassifier::new()));
                Err(err)
            }
            Err(err) => {
                tracing::warn!(
                    model = %self.config.model_name,
                    path = %self.config.model_path.display(),
                    error = %err,
                    "model load failed; using deterministic fallback"
                );
                *guard = Some(Backend::Fallback(FallbackClassifier::new()));
                Ok(ModelSource::Fallback)
            }
        }
    }

    /// Classifies a normalized view.
    ///
    /// On first use the adapter resolves its state by attempting to load the
    /// configured model; load problems force fallback mode and never fail
    /// the prediction itself.
    pub fn predict(
        &self,
        view: &NormalizedView,
        piece_id: &str,
    ) -> InspectResult<ClassProbabilities> {
        self.ensure_loaded();

        let guard = self
            .backend
            .read()
            .map_err(|_| InspectError::config_error("model state lock poisoned"))?;

        match &*guard {
            Some(Backend::Onnx(model)) => model.predict(view),
            Some(Backend::Fallback(fallback)) => Ok(fallback.classify(view, piece_id)),
            None => Err(InspectError::config_error("model state unresolved")),
        }
    }

    fn ensure_loaded(&self) {
        if self.source() == ModelSource::Unloaded {
            if let Err(err) = self.reload() {
                tracing::warn!(error = %err, "model rejected at load; continuing in fallback mode");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn missing_model_adapter() -> ModelAdapter {
        ModelAdapter::new(ModelConfig::new("definitely/not/there.onnx"))
    }

    fn zero_view() -> NormalizedView {
        NormalizedView::from_array(Array3::zeros((200, 200, 1))).unwrap()
    }

    #[test]
    fn test_missing_model_resolves_to_fallback() {
        let adapter = missing_model_adapter();
        assert_eq!(adapter.source(), ModelSource::Unloaded);

        let source = adapter.reload().unwrap();
        assert_eq!(source, ModelSource::Fallback);
        assert_eq!(adapter.source(), ModelSource::Fallback);
    }

    #[test]
    fn test_predict_lazily_resolves_state() {
        let adapter = missing_model_adapter();
        let probs = adapter.predict(&zero_view(), "TEST").unwrap();
        assert_eq!(adapter.source(), ModelSource::Fallback);

        let sum: f32 = probs.as_array().iter().sum();
        assert!((sum - 1.0).abs() <= 1e-6);
    }

    #[test]
    fn test_fallback_predictions_match_direct_classifier() {
        let adapter = missing_model_adapter();
        let view = zero_view();
        let via_adapter = adapter.predict(&view, "PIECE_9").unwrap();
        let direct = FallbackClassifier::new().classify(&view, "PIECE_9");
        assert_eq!(via_adapter.as_array(), direct.as_array());
    }

    #[test]
    fn test_shape_contract_rejection_forces_fallback_and_surfaces_error() {
        let adapter = missing_model_adapter();
        let rejection = Err(InspectError::shape_contract(
            "input",
            "[-1, 200, 200, 1]",
            "[-1, 224, 224, 3]",
        ));

        let err = adapter.install(rejection).unwrap_err();
        assert!(matches!(err, InspectError::ShapeContract { .. }));
        assert_eq!(adapter.source(), ModelSource::Fallback);

        // The adapter still serves predictions after the rejection.
        assert!(adapter.predict(&zero_view(), "TEST").is_ok());
    }

    #[test]
    fn test_reload_after_fallback_stays_fallback_when_file_still_missing() {
        let adapter = missing_model_adapter();
        adapter.reload().unwrap();
        let source = adapter.reload().unwrap();
        assert_eq!(source, ModelSource::Fallback);
    }
}
