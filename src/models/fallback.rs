//! Deterministic fallback classification.
//!
//! When no trained model is present the pipeline still has to produce valid,
//! reproducible distributions so that capture, normalization, aggregation,
//! and reporting can be exercised end to end. The fallback derives a
//! distribution from a SHA-256 digest of the normalized pixel data and the
//! piece identifier: identical inputs yield bit-identical output across
//! calls and process restarts, and no global RNG state is involved.

use crate::core::constants::NUM_CLASSES;
use crate::domain::{ClassProbabilities, NormalizedView};
use sha2::{Digest, Sha256};

/// Model-free classifier returning hash-derived probability distributions.
///
/// The six class weights are read from six independent re-hashes of the
/// content digest rather than from a seeded general-purpose PRNG, so the
/// output is bit-stable across platforms and library versions.
#[derive(Debug, Default)]
pub struct FallbackClassifier;

impl FallbackClassifier {
    /// Creates a new fallback classifier.
    pub fn new() -> Self {
        Self
    }

    /// Classifies a normalized view.
    ///
    /// Pure function of the pixel content and piece identifier. The returned
    /// distribution is valid (non-negative, sums to 1.0 within tolerance)
    /// for every input.
    pub fn classify(&self, view: &NormalizedView, piece_id: &str) -> ClassProbabilities {
        let digest = content_digest(view, piece_id);

        let mut weights = [0.0f64; NUM_CLASSES];
        for (i, weight) in weights.iter_mut().enumerate() {
            let mut round = Sha256::new();
            round.update(digest);
            round.update([i as u8]);
            let derived = round.finalize();

            let mut window = [0u8; 8];
            window.copy_from_slice(&derived[..8]);
            *weight = u64::from_le_bytes(window) as f64;
        }

        ClassProbabilities::from_weights(weights)
    }
}

/// Hashes the canonical byte encoding of (pixel bytes, piece id).
///
/// Pixels are fed in row-major order as little-endian f32 bytes, followed by
/// the piece identifier, so two different images collide no more often than
/// SHA-256 itself allows.
fn content_digest(view: &NormalizedView, piece_id: &str) -> [u8; 32] {
    let tensor = view.as_array();
    let mut bytes = Vec::with_capacity(tensor.len() * 4 + piece_id.len());
    for &v in tensor.iter() {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes.extend_from_slice(piece_id.as_bytes());
    Sha256::digest(&bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn zero_view() -> NormalizedView {
        NormalizedView::from_array(Array3::zeros((200, 200, 1))).unwrap()
    }

    fn patterned_view(seed: u8) -> NormalizedView {
        let tensor = Array3::from_shape_fn((200, 200, 1), |(y, x, _)| {
            ((x + y * 7 + seed as usize) % 256) as f32 / 255.0
        });
        NormalizedView::from_array(tensor).unwrap()
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = FallbackClassifier::new();
        let view = patterned_view(3);
        let a = classifier.classify(&view, "PIECE_A");
        let b = classifier.classify(&view, "PIECE_A");
        assert_eq!(a.as_array(), b.as_array());
    }

    #[test]
    fn test_zero_image_fixed_piece_id_is_stable() {
        let classifier = FallbackClassifier::new();
        let a = classifier.classify(&zero_view(), "TEST");
        let b = classifier.classify(&zero_view(), "TEST");
        assert_eq!(a.as_array(), b.as_array());
    }

    // Golden vector for the all-zero view with piece id "TEST". The scheme
    // is a pure function of (pixel bytes, piece id), so these exact values
    // must hold on every run, process, and platform; any drift here breaks
    // reproducibility for stored verdicts.
    #[test]
    fn test_zero_image_golden_vector() {
        let classifier = FallbackClassifier::new();
        let probs = classifier.classify(&zero_view(), "TEST");
        let expected = [
            0.206_907_138_f32,
            0.163_057_357,
            0.133_226_439,
            0.125_924_513,
            0.146_397_62,
            0.224_486_947,
        ];
        assert_eq!(probs.as_array(), &expected);
    }

    #[test]
    fn test_distribution_is_valid() {
        let classifier = FallbackClassifier::new();
        for seed in [0u8, 1, 42, 200] {
            let probs = classifier.classify(&patterned_view(seed), "P");
            assert!(probs.as_array().iter().all(|&p| p >= 0.0));
            let sum: f32 = probs.as_array().iter().sum();
            assert!((sum - 1.0).abs() <= 1e-6, "sum was {sum}");
        }
    }

    #[test]
    fn test_piece_id_changes_distribution() {
        let classifier = FallbackClassifier::new();
        let view = zero_view();
        let a = classifier.classify(&view, "PIECE_A");
        let b = classifier.classify(&view, "PIECE_B");
        assert_ne!(a.as_array(), b.as_array());
    }

    #[test]
    fn test_pixel_content_changes_distribution() {
        let classifier = FallbackClassifier::new();
        let a = classifier.classify(&patterned_view(1), "P");
        let b = classifier.classify(&patterned_view(2), "P");
        assert_ne!(a.as_array(), b.as_array());
    }
}
