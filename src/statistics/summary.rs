//! Arithmetic summarisation of raw measurement sequences.

use crate::types::SummaryStatistic;

/// Fold a sequence of raw samples into a [`SummaryStatistic`].
///
/// Computes min/max/avg directly and the *sample* standard deviation
/// (n - 1 denominator). With fewer than two samples the deviation is
/// undefined and reported as NaN; callers must check (`is_valid`) before
/// using the summary in derived comparisons. An empty input yields a
/// summary with NaN aggregates and a zero sample count.
///
/// # Arguments
///
/// * `samples` - Raw measurements in observation order
/// * `name` - Scenario name recorded on the summary
/// * `unit` - Unit of the measurements
pub fn summarize(samples: &[f64], name: &str, unit: &str) -> SummaryStatistic {
    if samples.is_empty() {
        return SummaryStatistic {
            name: name.to_string(),
            unit: unit.to_string(),
            avg: f64::NAN,
            first: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            std: f64::NAN,
            sample_count: 0,
        };
    }

    let n = samples.len();
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &x in samples {
        min = min.min(x);
        max = max.max(x);
        sum += x;
    }
    let avg = sum / n as f64;

    let std = if n > 1 {
        let mut sq_dev = 0.0;
        for &x in samples {
            sq_dev += (x - avg) * (x - avg);
        }
        (sq_dev / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    SummaryStatistic {
        name: name.to_string(),
        unit: unit.to_string(),
        avg,
        first: samples[0],
        min,
        max,
        std,
        sample_count: n as u64,
    }
}
