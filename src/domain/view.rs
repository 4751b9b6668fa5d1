//! View types: raw captures, normalized tensors, and verdicts.
//!
//! A [`RawView`] is one rendered raster of the inspected piece from a fixed
//! camera angle, as handed over by the capture frontend. The normalizer
//! turns it into a [`NormalizedView`], the canonical tensor every
//! classifier receives. A [`PieceVerdict`] is the aggregated, per-piece
//! result surfaced to the reporting workflow.

use crate::core::constants::IMG_SIZE;
use crate::core::errors::{InspectError, InspectResult};
use crate::core::Tensor3D;
use crate::domain::classes::{ClassProbabilities, DefectClass};
use image::RgbImage;
use serde::Serialize;

/// The fixed camera angles a piece is rendered from.
///
/// The core requires at least one view but does not enforce that tags are
/// unique or that all five are present; that policy belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewAngle {
    /// Isometric three-quarter view.
    Iso,
    /// Front view.
    Front,
    /// Left side view.
    Left,
    /// Right side view.
    Right,
    /// Top-down view.
    Top,
}

impl ViewAngle {
    /// The canonical capture order used by the renderer frontend.
    pub const CAPTURE_SEQUENCE: [ViewAngle; 5] = [
        ViewAngle::Iso,
        ViewAngle::Front,
        ViewAngle::Left,
        ViewAngle::Right,
        ViewAngle::Top,
    ];

    /// Returns the tag string for this angle.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewAngle::Iso => "iso",
            ViewAngle::Front => "front",
            ViewAngle::Left => "left",
            ViewAngle::Right => "right",
            ViewAngle::Top => "top",
        }
    }
}

impl std::fmt::Display for ViewAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured view of a piece: an 8-bit RGB raster plus its camera angle.
///
/// Immutable once captured; the aggregator discards it after normalization.
#[derive(Debug, Clone)]
pub struct RawView {
    image: RgbImage,
    angle: ViewAngle,
}

impl RawView {
    /// Creates a view from an RGB raster and its camera angle.
    pub fn new(image: RgbImage, angle: ViewAngle) -> Self {
        Self { image, angle }
    }

    /// Creates a view from raw interleaved RGB bytes.
    ///
    /// Returns `None` if the buffer length does not match `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>, angle: ViewAngle) -> Option<Self> {
        crate::utils::create_rgb_image(width, height, data).map(|image| Self::new(image, angle))
    }

    /// Returns the underlying raster.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Returns the camera angle this view was captured from.
    pub fn angle(&self) -> ViewAngle {
        self.angle
    }

    /// Returns the raster width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Returns the raster height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// The canonical tensor handed to every classifier.
///
/// Shape exactly (200, 200, 1), element type f32, values in [0.0, 1.0].
/// Shape, dtype, and range are an exact contract: construction goes through
/// [`NormalizedView::from_array`], which rejects any deviation instead of
/// coercing it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedView(Tensor3D);

impl NormalizedView {
    /// Wraps a tensor after checking the canonical contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape is not (200, 200, 1) or any value lies
    /// outside [0.0, 1.0].
    pub fn from_array(tensor: Tensor3D) -> InspectResult<Self> {
        let size = IMG_SIZE as usize;
        if tensor.shape() != [size, size, 1] {
            return Err(InspectError::invalid_raster(format!(
                "normalized view has shape {:?}, contract requires ({size}, {size}, 1)",
                tensor.shape()
            )));
        }
        if tensor.iter().any(|&v| !(0.0..=1.0).contains(&v)) {
            return Err(InspectError::invalid_raster(
                "normalized view contains values outside [0.0, 1.0]",
            ));
        }
        Ok(Self(tensor))
    }

    /// Returns the underlying (200, 200, 1) tensor.
    pub fn as_array(&self) -> &Tensor3D {
        &self.0
    }

    /// Consumes the view, returning the underlying tensor.
    pub fn into_inner(self) -> Tensor3D {
        self.0
    }
}

/// One classification result attributed to one view's camera angle.
///
/// Ephemeral; exists only while the aggregator combines per-view results.
#[derive(Debug, Clone)]
pub struct ViewPrediction {
    /// The camera angle of the scored view.
    pub angle: ViewAngle,
    /// The classifier's distribution for that view.
    pub probs: ClassProbabilities,
}

/// The aggregated verdict for one piece.
///
/// Created once per analysis request; owned by the caller after return.
#[derive(Debug, Clone, Serialize)]
pub struct PieceVerdict {
    /// The class with the maximum aggregated probability.
    pub predicted_class: DefectClass,
    /// The aggregated distribution over all six classes.
    pub class_probs: ClassProbabilities,
    /// Confidence (0-100) in the most probable defect class.
    ///
    /// The six-class label set contains no "no defect" class, so the
    /// operative definition is 100 x max aggregated probability: how
    /// confident the system is in its most likely defect type.
    pub anomaly_score: f32,
}
