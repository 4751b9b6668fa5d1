//! Image processing for the inspection pipeline.

pub mod normalization;

pub use normalization::ViewNormalizer;
