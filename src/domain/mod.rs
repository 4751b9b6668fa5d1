//! Domain types for surface-defect inspection.
//!
//! This module defines the closed defect-class set, probability
//! distributions over it, the view types produced by the capture frontend,
//! and the per-piece verdict returned to callers.

pub mod classes;
pub mod view;

pub use classes::{ClassProbabilities, DefectClass};
pub use view::{NormalizedView, PieceVerdict, RawView, ViewAngle, ViewPrediction};
