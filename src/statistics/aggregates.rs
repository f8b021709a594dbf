//! Composite aggregates with first-order error propagation.
//!
//! Speedup ratios compose multiplicatively, so combining them across
//! scenarios uses the geometric mean; rates that compose as reciprocals
//! (throughput-style) use the harmonic mean. Both carry their input
//! uncertainties through via first-order partial-derivative propagation.

/// Geometric mean of a sequence of rates: `(Π r_i)^(1/n)`.
///
/// Returns NaN for an empty input.
pub fn geometric_mean(rates: &[f64]) -> f64 {
    if rates.is_empty() {
        return f64::NAN;
    }
    let product: f64 = rates.iter().product();
    product.powf(1.0 / rates.len() as f64)
}

/// Geometric mean with propagated absolute error.
///
/// For rates `r_i` with absolute errors `e_i` and `G = (Π r_i)^(1/n)`,
/// the partial derivative is `∂G/∂r_i = G / (n · r_i)`, giving the
/// propagated variance `Σ (G / (n·r_i))^2 · e_i^2`.
///
/// # Arguments
///
/// * `points` - `(rate, absolute_error)` pairs
///
/// # Returns
///
/// `(geometric_mean, propagated_std)`; `(NaN, NaN)` for an empty input.
pub fn geometric_aggregate(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = points.len() as f64;
    let product: f64 = points.iter().map(|&(r, _)| r).product();
    let mean = product.powf(1.0 / n);

    let mut variance = 0.0;
    for &(rate, error) in points {
        let partial = mean / (n * rate);
        variance += (partial * error) * (partial * error);
    }
    (mean, variance.sqrt())
}

/// Harmonic mean of a sequence of rates: `n / Σ (1/r_i)`.
///
/// Returns NaN for an empty input.
pub fn harmonic_mean(rates: &[f64]) -> f64 {
    if rates.is_empty() {
        return f64::NAN;
    }
    let reciprocal_sum: f64 = rates.iter().map(|r| 1.0 / r).sum();
    rates.len() as f64 / reciprocal_sum
}

/// Harmonic mean with propagated absolute error.
///
/// For `H = n / S` with `S = Σ 1/r_j`, the partial derivative is
/// `∂H/∂r_i = n / (r_i^2 · S^2)`, giving the propagated variance
/// `Σ (∂H/∂r_i)^2 · e_i^2`.
///
/// # Returns
///
/// `(harmonic_mean, propagated_std)`; `(NaN, NaN)` for an empty input.
pub fn harmonic_aggregate(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = points.len() as f64;
    let reciprocal_sum: f64 = points.iter().map(|&(r, _)| 1.0 / r).sum();
    let mean = n / reciprocal_sum;

    let outer = n / (reciprocal_sum * reciprocal_sum);
    let mut variance = 0.0;
    for &(rate, error) in points {
        let partial = outer / (rate * rate);
        variance += partial * partial * error * error;
    }
    (mean, variance.sqrt())
}

/// First-order error of a quotient or product via relative-error quadrature.
///
/// For `q = a / b` (or `a · b`) the relative errors add in quadrature:
/// `e_q = |q| · sqrt((e_a/a)^2 + (e_b/b)^2)`.
pub fn ratio_quadrature(ratio: f64, a: f64, e_a: f64, b: f64, e_b: f64) -> f64 {
    let rel_a = e_a / a;
    let rel_b = e_b / b;
    ratio * (rel_a * rel_a + rel_b * rel_b).sqrt()
}
