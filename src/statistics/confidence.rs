//! Confidence-interval arithmetic and sample-size estimation.

use std::fmt;

use crate::types::Interval;

/// Supported confidence levels and their two-sided z-scores.
///
/// Requesting a level outside this table is a programming error and fails
/// with [`StatsError::UnsupportedConfidenceLevel`].
pub const CONFIDENCE_LEVELS: [(f64, f64); 8] = [
    (0.70, 1.036),
    (0.75, 1.150),
    (0.80, 1.282),
    (0.85, 1.440),
    (0.90, 1.645),
    (0.95, 1.960),
    (0.98, 2.326),
    (0.99, 2.576),
];

/// Errors from the confidence math.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsError {
    /// Requested confidence level is not in the fixed z-score table.
    UnsupportedConfidenceLevel {
        /// The level that was requested.
        level: f64,
    },
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::UnsupportedConfidenceLevel { level } => {
                write!(
                    f,
                    "unsupported confidence level {level}; supported levels: \
                     0.70, 0.75, 0.80, 0.85, 0.90, 0.95, 0.98, 0.99"
                )
            }
        }
    }
}

impl std::error::Error for StatsError {}

/// Look up the z-score for a confidence level.
pub fn z_score(confidence_level: f64) -> Result<f64, StatsError> {
    CONFIDENCE_LEVELS
        .iter()
        .find(|(level, _)| (level - confidence_level).abs() < 1e-9)
        .map(|&(_, z)| z)
        .ok_or(StatsError::UnsupportedConfidenceLevel {
            level: confidence_level,
        })
}

/// Half-width of a confidence interval: `z(level) * se`.
pub fn confidence_half_width(se: f64, confidence_level: f64) -> Result<f64, StatsError> {
    Ok(z_score(confidence_level)? * se)
}

/// Confidence interval around a mean, given the standard error of the mean.
pub fn confidence_interval(avg: f64, se: f64, confidence_level: f64) -> Result<Interval, StatsError> {
    let width = confidence_half_width(se, confidence_level)?;
    Ok(Interval::new(avg - width, avg + width))
}

/// Confidence interval from raw standard deviation and sample count.
pub fn confidence_interval_from_std(
    avg: f64,
    std: f64,
    sample_count: u64,
    confidence_level: f64,
) -> Result<Interval, StatsError> {
    confidence_interval(avg, std / (sample_count as f64).sqrt(), confidence_level)
}

/// Samples needed so the confidence interval stays within a relative width.
///
/// The classic sample-size-for-margin-of-error formula:
/// `round((z * std / (mean * relative_width))^2)`. With `relative_width`
/// = 0.10 at level 0.90 this answers "how many samples until the 90% CI is
/// within ±10% of the mean".
pub fn required_sample_count(
    mean: f64,
    std: f64,
    confidence_level: f64,
    relative_width: f64,
) -> Result<u64, StatsError> {
    let z = z_score(confidence_level)?;
    let count = ((z * std) / (mean * relative_width)).powi(2).round();
    Ok(count as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_interval() {
        // Cross-checked against a standard confidence interval calculator:
        // n=50, mean=20.6, sd=3.2, 95% level.
        let interval = confidence_interval_from_std(20.6, 3.2, 50, 0.95).unwrap();
        assert!((interval.min - 19.713).abs() < 0.005);
        assert!((interval.max - 21.487).abs() < 0.005);
    }

    #[test]
    fn interval_is_symmetric_about_mean() {
        for &(level, _) in CONFIDENCE_LEVELS.iter() {
            let interval = confidence_interval(12.0, 1.5, level).unwrap();
            let mid = (interval.min + interval.max) / 2.0;
            assert!((mid - 12.0).abs() < 1e-12, "level {level}");
        }
    }

    #[test]
    fn half_width_increases_with_level() {
        let mut last = 0.0;
        for &(level, _) in CONFIDENCE_LEVELS.iter() {
            let w = confidence_half_width(2.0, level).unwrap();
            assert!(w > last, "half-width not increasing at level {level}");
            last = w;
        }
    }

    #[test]
    fn unsupported_level_is_rejected() {
        assert!(matches!(
            z_score(0.91),
            Err(StatsError::UnsupportedConfidenceLevel { .. })
        ));
        assert!(confidence_interval(1.0, 1.0, 0.42).is_err());
        assert!(required_sample_count(1.0, 1.0, 0.123, 0.1).is_err());
    }

    #[test]
    fn sample_count_for_target_precision() {
        // z=1.645, std=3, mean=10, width=0.1 -> (1.645*3 / 1)^2 = 24.35... -> 24
        let n = required_sample_count(10.0, 3.0, 0.90, 0.10).unwrap();
        assert_eq!(n, 24);
    }

    #[test]
    fn sample_count_grows_with_variance() {
        let low = required_sample_count(10.0, 1.0, 0.90, 0.10).unwrap();
        let high = required_sample_count(10.0, 5.0, 0.90, 0.10).unwrap();
        assert!(high > low);
    }
}
