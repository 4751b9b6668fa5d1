//! Constants used throughout the inspection pipeline.

/// Canonical spatial size (width and height) of a normalized view.
///
/// Every classifier, real or fallback, receives tensors with exactly this
/// spatial extent. Changing it invalidates any trained model.
pub const IMG_SIZE: u32 = 200;

/// Number of surface-defect classes in the closed label set.
pub const NUM_CLASSES: usize = 6;

/// Environment variable consulted for the trained model location.
pub const MODEL_PATH_ENV: &str = "MODEL_PATH";

/// Default location of the trained classifier model.
pub const DEFAULT_MODEL_PATH: &str = "models/neu_cnn_model.onnx";

/// Minimum number of views above which per-view work is parallelized.
pub const PARALLEL_VIEW_THRESHOLD: usize = 2;
