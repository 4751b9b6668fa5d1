//! View normalization.
//!
//! This module converts an arbitrary-size color raster into the canonical
//! tensor the classifier contract requires. The step order is load-bearing:
//! grayscale conversion precedes resizing so interpolation never mixes
//! independent color channels, and the channel axis is appended last so it
//! wraps the final resized values.

use crate::core::constants::IMG_SIZE;
use crate::core::errors::{InspectError, InspectResult};
use crate::domain::{NormalizedView, RawView};
use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::Array3;

/// Luma weights for RGB-to-grayscale conversion (ITU-R BT.601).
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Normalizes captured views into the canonical classifier input.
///
/// The transform is pure and deterministic: for a given raster it always
/// produces the same (200, 200, 1) float tensor with values in [0, 1].
#[derive(Debug, Default)]
pub struct ViewNormalizer;

impl ViewNormalizer {
    /// Creates a new normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalizes a captured view.
    ///
    /// Algorithm, in this exact order:
    /// 1. Convert the RGB raster to 8-bit luminance (0.299 R + 0.587 G + 0.114 B).
    /// 2. Resize to 200x200 with bilinear filtering.
    /// 3. Cast to f32 and divide by 255.0.
    /// 4. Append a trailing channel axis of size 1.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::InvalidRaster`] for a zero-width or
    /// zero-height input; valid rasters never fail.
    pub fn normalize(&self, view: &RawView) -> InspectResult<NormalizedView> {
        let (width, height) = (view.width(), view.height());
        if width == 0 || height == 0 {
            return Err(InspectError::invalid_raster(format!(
                "zero-size raster ({width}x{height}) for view '{}'",
                view.angle()
            )));
        }

        let gray = rgb_to_luma(view);
        let resized = imageops::resize(&gray, IMG_SIZE, IMG_SIZE, FilterType::Triangle);

        let size = IMG_SIZE as usize;
        let mut values = Vec::with_capacity(size * size);
        for pixel in resized.pixels() {
            values.push(f32::from(pixel.0[0]) / 255.0);
        }

        let tensor = Array3::from_shape_vec((size, size, 1), values)?;
        NormalizedView::from_array(tensor)
    }
}

/// Converts an RGB raster to 8-bit luminance with BT.601 weighting.
fn rgb_to_luma(view: &RawView) -> GrayImage {
    let img = view.image();
    let mut data = Vec::with_capacity((img.width() * img.height()) as usize);
    for pixel in img.pixels() {
        let [r, g, b] = pixel.0;
        let luma = LUMA_R * f32::from(r) + LUMA_G * f32::from(g) + LUMA_B * f32::from(b);
        data.push(luma.round() as u8);
    }
    // Length matches width * height by construction.
    GrayImage::from_raw(img.width(), img.height(), data).expect("luma buffer size")
}
