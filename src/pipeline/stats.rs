//! Per-run statistics for one piece analysis.

use std::time::Duration;

/// Counters and timing for one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Number of views submitted for the piece.
    pub views_total: usize,
    /// Number of views that produced a classification.
    pub views_scored: usize,
    /// Number of views skipped due to invalid rasters.
    pub views_skipped: usize,
    /// Wall-clock time for the whole run.
    pub elapsed: Duration,
}

impl RunStats {
    /// Creates stats for a run over `views_total` submitted views.
    pub fn new(views_total: usize) -> Self {
        Self {
            views_total,
            ..Self::default()
        }
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} views ({} scored, {} skipped) in {:.1}ms",
            self.views_total,
            self.views_scored,
            self.views_skipped,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}
