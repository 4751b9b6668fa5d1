//! The capture-to-verdict pipeline.
//!
//! [`ViewAggregator`] drives the full analysis for one piece: normalize each
//! captured view, classify it through the model adapter, and fold the
//! per-view distributions into a single [`PieceVerdict`](crate::domain::PieceVerdict).

pub mod aggregator;
pub mod stats;

pub use aggregator::ViewAggregator;
pub use stats::RunStats;
