//! Statistical aggregation and error propagation.
//!
//! This module turns raw measurement sequences into [`SummaryStatistic`]
//! records and provides the uncertainty arithmetic the rest of the engine is
//! built on:
//!
//! - Arithmetic summaries with sample standard deviation
//! - Confidence intervals from a fixed z-score table
//! - Sample-size estimation for a target relative precision
//! - Geometric and harmonic aggregates with first-order error propagation
//!
//! All functions are pure: they operate on the slices they are given and
//! hold no hidden state.
//!
//! [`SummaryStatistic`]: crate::types::SummaryStatistic

mod aggregates;
mod confidence;
mod summary;

pub use aggregates::{
    geometric_aggregate, geometric_mean, harmonic_aggregate, harmonic_mean, ratio_quadrature,
};
pub use confidence::{
    confidence_half_width, confidence_interval, confidence_interval_from_std,
    required_sample_count, z_score, StatsError, CONFIDENCE_LEVELS,
};
pub use summary::summarize;
