//! The core module of the inspection pipeline.
//!
//! This module contains the fundamental components shared across the pipeline:
//! - Constants used throughout the crate
//! - Model configuration and the tensor shape contract
//! - Error handling
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod constants;
pub mod errors;

pub use config::{Dim, ModelConfig, TensorShape};
pub use constants::*;
pub use errors::{InspectError, InspectResult};

/// Tensor type aliases shared by the preprocessing and inference stages.
pub type Tensor2D = ndarray::Array2<f32>;
/// A single normalized view in HWC layout.
pub type Tensor3D = ndarray::Array3<f32>;
/// A batch of normalized views in NHWC layout.
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and
/// formatting layer. It's typically called at the start of an application to
/// enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
