//! Expected-improvement acquisition.

use bopt_surrogate::{Surrogate, SurrogateResult};

// ---------- normal distribution helpers ----------

/// Standard normal probability density function.
pub(crate) fn norm_pdf(x: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal cumulative distribution function.
pub(crate) fn norm_cdf(x: f64) -> f64 {
    0.5 * libm::erfc(-x / std::f64::consts::SQRT_2)
}

// ---------- expected improvement ----------

/// Expected improvement of evaluating the objective at `x` over
/// `current_max`, under the surrogate's predictive distribution.
///
/// Propagates the surrogate's prediction error unchanged.
pub fn expected_improvement<S>(x: f64, current_max: f64, model: &S) -> SurrogateResult<f64>
where
    S: Surrogate + ?Sized,
{
    let (mean, std) = model.predict_one(x)?;
    Ok(expected_improvement_from_moments(mean, std, current_max))
}

/// Closed-form expected improvement for a normal prediction `(mean, std)`.
///
/// With `Dm = mean - current_max` and `gamma = Dm / std`:
///
/// `EI = max(Dm, 0) + std φ(gamma) − |Dm| Φ(−|gamma|)`
///
/// which equals `Dm Φ(gamma) + std φ(gamma)` for either sign of `Dm`.
///
/// A zero (or non-finite) `std` means the prediction is certain, and the
/// score is the limit `max(Dm, 0)`: zero for any candidate not predicted
/// above the incumbent. Rounding noise below zero is clamped away.
pub fn expected_improvement_from_moments(mean: f64, std: f64, current_max: f64) -> f64 {
    let dm = mean - current_max;
    if !(std > 0.0 && std.is_finite()) {
        return dm.max(0.0);
    }

    let gamma = dm / std;
    let score = dm.max(0.0) + std * norm_pdf(gamma) - dm.abs() * norm_cdf(-gamma.abs());
    score.max(0.0)
}
