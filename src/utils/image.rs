//! Image acquisition helpers.
//!
//! Captured views arrive either as encoded payloads (PNG/JPEG bytes from a
//! capture rig or an upload) or as raw interleaved RGB buffers; everything
//! downstream works on [`RgbImage`].

use crate::core::errors::{InspectError, InspectResult};
use image::{ImageBuffer, RgbImage};
use std::path::Path;

/// Builds an [`RgbImage`] from a raw interleaved RGB buffer.
///
/// Returns `None` when the buffer length does not match `width * height * 3`.
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    let expected = width as usize * height as usize * 3;
    if data.len() != expected {
        return None;
    }
    ImageBuffer::from_raw(width, height, data)
}

/// Decodes an encoded image payload (PNG, JPEG, BMP, ...) into RGB.
pub fn decode_image(bytes: &[u8]) -> InspectResult<RgbImage> {
    if bytes.is_empty() {
        return Err(InspectError::invalid_raster("empty image payload"));
    }
    let dynamic = image::load_from_memory(bytes)?;
    Ok(dynamic.to_rgb8())
}

/// Loads an image from disk and converts it to RGB.
pub fn load_image(path: &Path) -> InspectResult<RgbImage> {
    let dynamic = image::open(path).map_err(|err| {
        tracing::debug!(path = %path.display(), error = %err, "image open failed");
        err
    })?;
    Ok(dynamic.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::io::Cursor;

    #[test]
    fn test_create_rgb_image_accepts_exact_buffer() {
        let img = create_rgb_image(2, 2, vec![0u8; 12]).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
    }

    #[test]
    fn test_create_rgb_image_rejects_short_buffer() {
        assert!(create_rgb_image(2, 2, vec![0u8; 11]).is_none());
    }

    #[test]
    fn test_decode_image_round_trips_png() {
        let mut img = RgbImage::new(3, 3);
        img.put_pixel(1, 1, Rgb([200, 10, 50]));

        let mut encoded = Vec::new();
        img.write_to(&mut Cursor::new(&mut encoded), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_image(&encoded).unwrap();
        assert_eq!(decoded.dimensions(), (3, 3));
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([200, 10, 50]));
    }

    #[test]
    fn test_decode_image_rejects_empty_payload() {
        assert!(matches!(
            decode_image(&[]),
            Err(InspectError::InvalidRaster { .. })
        ));
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        assert!(decode_image(&[0x00, 0x01, 0x02, 0x03]).is_err());
    }
}
