//! # NEU Inspect
//!
//! A Rust library for multi-view surface-defect inspection. A 3D piece is
//! rendered from a fixed set of camera angles; each rendered view is
//! normalized into a canonical grayscale tensor, classified into one of six
//! surface-defect categories, and the per-view results are aggregated into a
//! single verdict for the piece.
//!
//! ## Features
//!
//! - Bit-exact view normalization (200x200 single-channel float tensor)
//! - ONNX Runtime integration for trained classifiers
//! - Deterministic hash-based fallback classifier when no model is present
//! - Cross-view aggregation with a fixed class ordering and anomaly scoring
//!
//! ## Modules
//!
//! * [`core`] - Error handling, constants, and model configuration
//! * [`domain`] - Defect classes, probability distributions, views, verdicts
//! * [`models`] - Fallback classifier, ONNX classifier, and the model adapter
//! * [`pipeline`] - The view aggregator and run statistics
//! * [`processors`] - View normalization
//! * [`utils`] - Image helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neu_inspect::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ModelConfig::from_env();
//! let adapter = Arc::new(ModelAdapter::new(config));
//! let aggregator = ViewAggregator::new(adapter);
//!
//! let views: Vec<RawView> = Vec::new(); // supplied by the capture frontend
//! let verdict = aggregator.aggregate(&views, "PIECE_20260830_0001")?;
//! println!("{}: {:.2}%", verdict.predicted_class, verdict.anomaly_score);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod models;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use neu_inspect::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{InspectError, InspectResult, ModelConfig};
    pub use crate::domain::{ClassProbabilities, DefectClass, PieceVerdict, RawView, ViewAngle};
    pub use crate::models::{ModelAdapter, ModelSource};
    pub use crate::pipeline::ViewAggregator;
    pub use crate::utils::{decode_image, load_image};
}
