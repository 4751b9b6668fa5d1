//! Cross-view aggregation into a per-piece verdict.

use crate::core::constants::{NUM_CLASSES, PARALLEL_VIEW_THRESHOLD};
use crate::core::errors::{InspectError, InspectResult};
use crate::domain::{ClassProbabilities, PieceVerdict, RawView, ViewPrediction};
use crate::models::ModelAdapter;
use crate::pipeline::stats::RunStats;
use crate::processors::ViewNormalizer;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;

/// Drives the full analysis for one piece.
///
/// Each submitted view is normalized and classified independently; the
/// per-view distributions are then combined by unweighted mean, so the
/// result does not depend on the order views were captured in. Views whose
/// rasters fail normalization are skipped with a warning; any other failure
/// aborts the run.
#[derive(Debug)]
pub struct ViewAggregator {
    normalizer: ViewNormalizer,
    adapter: Arc<ModelAdapter>,
}

impl ViewAggregator {
    /// Creates an aggregator backed by the given model adapter.
    pub fn new(adapter: Arc<ModelAdapter>) -> Self {
        Self {
            normalizer: ViewNormalizer::new(),
            adapter,
        }
    }

    /// Returns the model adapter backing this aggregator.
    pub fn adapter(&self) -> &ModelAdapter {
        &self.adapter
    }

    /// Analyzes all views of a piece and returns its verdict.
    ///
    /// # Errors
    ///
    /// Returns [`InspectError::NoValidViews`] when no view produced a
    /// classification, and propagates inference or state errors unchanged.
    pub fn aggregate(&self, views: &[RawView], piece_id: &str) -> InspectResult<PieceVerdict> {
        self.aggregate_with_stats(views, piece_id)
            .map(|(verdict, _)| verdict)
    }

    /// Like [`aggregate`](Self::aggregate), additionally returning run
    /// counters and timing.
    pub fn aggregate_with_stats(
        &self,
        views: &[RawView],
        piece_id: &str,
    ) -> InspectResult<(PieceVerdict, RunStats)> {
        let start = Instant::now();
        if views.is_empty() {
            return Err(InspectError::no_valid_views(piece_id));
        }

        let scored: Vec<InspectResult<Option<ViewPrediction>>> =
            if views.len() > PARALLEL_VIEW_THRESHOLD {
                views
                    .par_iter()
                    .map(|view| self.score_view(view, piece_id))
                    .collect()
            } else {
                views
                    .iter()
                    .map(|view| self.score_view(view, piece_id))
                    .collect()
            };

        let mut stats = RunStats::new(views.len());
        let mut predictions = Vec::with_capacity(views.len());
        for result in scored {
            match result? {
                Some(prediction) => predictions.push(prediction),
                None => stats.views_skipped += 1,
            }
        }
        stats.views_scored = predictions.len();

        if predictions.is_empty() {
            return Err(InspectError::no_valid_views(piece_id));
        }

        let class_probs = mean_distribution(&predictions);
        let (predicted_class, top_prob) = class_probs.top_class();
        let verdict = PieceVerdict {
            predicted_class,
            class_probs,
            anomaly_score: top_prob * 100.0,
        };

        stats.elapsed = start.elapsed();
        tracing::info!(
            piece_id,
            predicted = %verdict.predicted_class,
            anomaly_score = verdict.anomaly_score,
            %stats,
            "piece analysis complete"
        );
        Ok((verdict, stats))
    }

    fn score_view(&self, view: &RawView, piece_id: &str) -> InspectResult<Option<ViewPrediction>> {
        let normalized = match self.normalizer.normalize(view) {
            Ok(normalized) => normalized,
            Err(InspectError::InvalidRaster { message }) => {
                tracing::warn!(piece_id, angle = %view.angle(), %message, "skipping invalid view");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let probs = self.adapter.predict(&normalized, piece_id)?;
        Ok(Some(ViewPrediction {
            angle: view.angle(),
            probs,
        }))
    }
}

/// Unweighted mean of per-view distributions, accumulated in f64 so the
/// result is independent of view order.
pub(crate) fn mean_distribution(predictions: &[ViewPrediction]) -> ClassProbabilities {
    let mut acc = [0.0f64; NUM_CLASSES];
    for prediction in predictions {
        for (i, &p) in prediction.probs.as_array().iter().enumerate() {
            acc[i] += f64::from(p);
        }
    }
    let n = predictions.len() as f64;
    for slot in &mut acc {
        *slot /= n;
    }
    ClassProbabilities::from_weights(acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ModelConfig;
    use crate::core::constants::IMG_SIZE;
    use crate::domain::{DefectClass, ViewAngle};
    use image::{Rgb, RgbImage};

    fn fallback_aggregator() -> ViewAggregator {
        let config = ModelConfig::new("definitely/not/there.onnx");
        ViewAggregator::new(Arc::new(ModelAdapter::new(config)))
    }

    fn solid_view(level: u8, angle: ViewAngle) -> RawView {
        let image = RgbImage::from_pixel(IMG_SIZE, IMG_SIZE, Rgb([level, level, level]));
        RawView::new(image, angle)
    }

    fn zero_size_view(angle: ViewAngle) -> RawView {
        RawView::new(RgbImage::new(0, 0), angle)
    }

    fn prediction(angle: ViewAngle, probs: [f32; NUM_CLASSES]) -> ViewPrediction {
        ViewPrediction {
            angle,
            probs: ClassProbabilities::new(probs).unwrap(),
        }
    }

    #[test]
    fn test_empty_view_set_is_an_error() {
        let aggregator = fallback_aggregator();
        let err = aggregator.aggregate(&[], "PIECE_0").unwrap_err();
        assert!(matches!(err, InspectError::NoValidViews { .. }));
    }

    #[test]
    fn test_all_views_invalid_is_an_error() {
        let aggregator = fallback_aggregator();
        let views = vec![
            zero_size_view(ViewAngle::Iso),
            zero_size_view(ViewAngle::Front),
        ];
        let err = aggregator.aggregate(&views, "PIECE_1").unwrap_err();
        assert!(matches!(err, InspectError::NoValidViews { .. }));
    }

    #[test]
    fn test_invalid_views_are_skipped_not_fatal() {
        let aggregator = fallback_aggregator();
        let views = vec![
            solid_view(10, ViewAngle::Iso),
            zero_size_view(ViewAngle::Front),
            solid_view(200, ViewAngle::Top),
        ];
        let (verdict, stats) = aggregator.aggregate_with_stats(&views, "PIECE_2").unwrap();
        assert_eq!(stats.views_total, 3);
        assert_eq!(stats.views_scored, 2);
        assert_eq!(stats.views_skipped, 1);

        let sum: f32 = verdict.class_probs.as_array().iter().sum();
        assert!((sum - 1.0).abs() <= 1e-6);
    }

    #[test]
    fn test_verdict_is_independent_of_view_order() {
        let aggregator = fallback_aggregator();
        let forward: Vec<RawView> = ViewAngle::CAPTURE_SEQUENCE
            .iter()
            .enumerate()
            .map(|(i, &angle)| solid_view(40 * i as u8 + 10, angle))
            .collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregator.aggregate(&forward, "PIECE_3").unwrap();
        let b = aggregator.aggregate(&reversed, "PIECE_3").unwrap();

        assert_eq!(a.predicted_class, b.predicted_class);
        for (pa, pb) in a
            .class_probs
            .as_array()
            .iter()
            .zip(b.class_probs.as_array())
        {
            assert!((pa - pb).abs() <= 1e-6);
        }
    }

    #[test]
    fn test_mean_distribution_is_unweighted() {
        let preds = vec![
            prediction(ViewAngle::Iso, [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            prediction(ViewAngle::Front, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        ];
        let mean = mean_distribution(&preds);
        assert!((mean.get(DefectClass::Crazing) - 0.5).abs() <= 1e-6);
        assert!((mean.get(DefectClass::Inclusion) - 0.5).abs() <= 1e-6);
        assert_eq!(mean.get(DefectClass::Scratches), 0.0);
    }

    #[test]
    fn test_aggregated_tie_breaks_by_class_order() {
        // Patches and scratches tie at 0.5 after averaging; patches comes
        // first in the fixed class ordering.
        let preds = vec![
            prediction(ViewAngle::Iso, [0.0, 0.0, 1.0, 0.0, 0.0, 0.0]),
            prediction(ViewAngle::Front, [0.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
        ];
        let mean = mean_distribution(&preds);
        let (top, p) = mean.top_class();
        assert_eq!(top, DefectClass::Patches);
        assert!((p - 0.5).abs() <= 1e-6);
    }

    #[test]
    fn test_anomaly_score_is_top_probability_times_hundred() {
        let aggregator = fallback_aggregator();
        let views = vec![solid_view(128, ViewAngle::Iso)];
        let verdict = aggregator.aggregate(&views, "PIECE_4").unwrap();

        let (_, top) = verdict.class_probs.top_class();
        assert!((verdict.anomaly_score - top * 100.0).abs() <= 1e-4);
        assert!(verdict.anomaly_score >= 0.0 && verdict.anomaly_score <= 100.0);
    }

    #[test]
    fn test_single_view_verdict_matches_that_view() {
        let aggregator = fallback_aggregator();
        let views = vec![solid_view(77, ViewAngle::Left)];
        let verdict = aggregator.aggregate(&views, "PIECE_5").unwrap();
        let again = aggregator.aggregate(&views, "PIECE_5").unwrap();
        assert_eq!(verdict.predicted_class, again.predicted_class);
        assert_eq!(verdict.class_probs.as_array(), again.class_probs.as_array());
    }
}
