//! Shared utilities.

pub mod image;

pub use image::{create_rgb_image, decode_image, load_image};
