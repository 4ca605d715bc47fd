//! Gaussian process regression over a single input dimension.
//!
//! The kernel is a squared exponential (RBF)
//!
//! `k(a, b) = σ² exp(-(a - b)² / (2 l²))`
//!
//! with `noise_variance` added to the diagonal of the training matrix.
//! Fitting factors `K + σₙ²I` once via Cholesky; predictions reuse the
//! factor for both mean and variance.

use nalgebra::{linalg::Cholesky, DMatrix, DVector, Dyn};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bopt_types::{BoError, BoResult, SurrogateError};

use crate::model::{Prediction, Surrogate, SurrogateBuilder, SurrogateResult};

const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// How the kernel length scale is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LengthScale {
    /// Use this length scale as-is.
    Fixed(f64),
    /// Pick the length scale maximizing the log marginal likelihood over
    /// `steps` log-spaced candidates in `[low, high]`.
    Fitted { low: f64, high: f64, steps: usize },
}

/// Hyperparameters of the Gaussian process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpConfig {
    pub length_scale: LengthScale,
    /// Prior variance of the latent function (in normalized units when
    /// `normalize_y` is set).
    pub signal_variance: f64,
    /// Added to the kernel diagonal; doubles as numerical jitter.
    pub noise_variance: f64,
    /// Standardize targets to zero mean and unit variance before fitting.
    pub normalize_y: bool,
}

impl Default for GpConfig {
    fn default() -> Self {
        Self {
            length_scale: LengthScale::Fitted {
                low: 1e-2,
                high: 1e3,
                steps: 60,
            },
            signal_variance: 1.0,
            noise_variance: 1e-10,
            normalize_y: true,
        }
    }
}

impl GpConfig {
    /// Unit-variance RBF with unit length scale and a zero prior mean, no
    /// hyperparameter search.
    pub fn unit_rbf() -> Self {
        Self {
            length_scale: LengthScale::Fixed(1.0),
            signal_variance: 1.0,
            noise_variance: 1e-10,
            normalize_y: false,
        }
    }

    pub fn with_length_scale(mut self, length_scale: LengthScale) -> Self {
        self.length_scale = length_scale;
        self
    }

    pub fn with_noise_variance(mut self, noise_variance: f64) -> Self {
        self.noise_variance = noise_variance;
        self
    }

    pub fn with_signal_variance(mut self, signal_variance: f64) -> Self {
        self.signal_variance = signal_variance;
        self
    }

    pub fn with_normalize_y(mut self, normalize_y: bool) -> Self {
        self.normalize_y = normalize_y;
        self
    }

    pub fn from_json(json: &str) -> BoResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(BoError::from)?;
        Ok(config)
    }

    pub fn to_json(&self) -> BoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> SurrogateResult<()> {
        let invalid = |name: &str, value: f64| SurrogateError::InvalidHyperparameter {
            name: name.to_string(),
            value,
        };

        if !(self.signal_variance.is_finite() && self.signal_variance > 0.0) {
            return Err(invalid("signal_variance", self.signal_variance));
        }
        if !(self.noise_variance.is_finite() && self.noise_variance >= 0.0) {
            return Err(invalid("noise_variance", self.noise_variance));
        }
        match self.length_scale {
            LengthScale::Fixed(l) => {
                if !(l.is_finite() && l > 0.0) {
                    return Err(invalid("length_scale", l));
                }
            }
            LengthScale::Fitted { low, high, steps } => {
                if !(low.is_finite() && low > 0.0) {
                    return Err(invalid("length_scale.low", low));
                }
                if !(high.is_finite() && high > low) {
                    return Err(invalid("length_scale.high", high));
                }
                if steps == 0 {
                    return Err(invalid("length_scale.steps", 0.0));
                }
            }
        }
        Ok(())
    }
}

impl SurrogateBuilder for GpConfig {
    type Model = GaussianProcess;

    fn fit(&self, x: &[f64], y: &[f64]) -> SurrogateResult<GaussianProcess> {
        GaussianProcess::fit(self, x, y)
    }
}

/// A Gaussian process conditioned on its training data.
#[derive(Debug, Clone)]
pub struct GaussianProcess {
    x_train: Vec<f64>,
    /// Factor of `K + σₙ²I`.
    cholesky: Cholesky<f64, Dyn>,
    /// `(K + σₙ²I)⁻¹ y`, in normalized units.
    alpha: DVector<f64>,
    length_scale: f64,
    signal_variance: f64,
    y_mean: f64,
    y_std: f64,
    log_marginal_likelihood: f64,
}

impl GaussianProcess {
    /// Fit a new process on `(x, y)`.
    pub fn fit(config: &GpConfig, x: &[f64], y: &[f64]) -> SurrogateResult<Self> {
        config.validate()?;
        check_training_data(x, y)?;

        let (y_mean, y_std) = if config.normalize_y {
            mean_and_std(y)
        } else {
            (0.0, 1.0)
        };
        let y_norm = DVector::from_iterator(y.len(), y.iter().map(|v| (v - y_mean) / y_std));

        let fitted = match config.length_scale {
            LengthScale::Fixed(l) => factor(x, &y_norm, l, config)
                .ok_or(SurrogateError::NotPositiveDefinite { length_scale: l })?,
            LengthScale::Fitted { low, high, steps } => {
                let grid = log_grid(low, high, steps);
                let best = grid
                    .iter()
                    .filter_map(|&l| factor(x, &y_norm, l, config))
                    .fold(None::<Factored>, |best, cand| match best {
                        Some(b) if b.lml >= cand.lml => Some(b),
                        _ => Some(cand),
                    })
                    .ok_or(SurrogateError::NotPositiveDefinite { length_scale: low })?;

                if grid.len() > 1
                    && (best.length_scale == grid[0] || best.length_scale == grid[grid.len() - 1])
                {
                    warn!(
                        "Fitted length scale {} sits on the search boundary [{}, {}]",
                        best.length_scale, low, high
                    );
                }
                best
            }
        };

        debug!(
            "Fitted GP on {} samples: length_scale={:.4}, log_marginal_likelihood={:.4}",
            x.len(),
            fitted.length_scale,
            fitted.lml
        );

        Ok(Self {
            x_train: x.to_vec(),
            cholesky: fitted.cholesky,
            alpha: fitted.alpha,
            length_scale: fitted.length_scale,
            signal_variance: config.signal_variance,
            y_mean,
            y_std,
            log_marginal_likelihood: fitted.lml,
        })
    }

    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    pub fn log_marginal_likelihood(&self) -> f64 {
        self.log_marginal_likelihood
    }

    pub fn training_inputs(&self) -> &[f64] {
        &self.x_train
    }

    fn kernel_vector(&self, x: f64) -> DVector<f64> {
        DVector::from_iterator(
            self.x_train.len(),
            self.x_train
                .iter()
                .map(|&xi| rbf(x, xi, self.length_scale, self.signal_variance)),
        )
    }
}

impl Surrogate for GaussianProcess {
    fn predict(&self, x: &[f64]) -> SurrogateResult<Prediction> {
        let mut mean = Vec::with_capacity(x.len());
        let mut std = Vec::with_capacity(x.len());

        for (index, &xi) in x.iter().enumerate() {
            if !xi.is_finite() {
                return Err(SurrogateError::NonFiniteInput { index, value: xi });
            }
            let k_star = self.kernel_vector(xi);
            let m = k_star.dot(&self.alpha);

            // k(x, x) - k*ᵀ (K + σₙ²I)⁻¹ k*
            let v = self.cholesky.solve(&k_star);
            let var = (self.signal_variance - k_star.dot(&v)).max(0.0);

            mean.push(m * self.y_std + self.y_mean);
            std.push(var.sqrt() * self.y_std);
        }

        Ok(Prediction { mean, std })
    }

    fn n_samples(&self) -> usize {
        self.x_train.len()
    }
}

// ---------------------------------------------------------------------------
// Fitting helpers
// ---------------------------------------------------------------------------

/// A factored kernel matrix for one candidate length scale.
struct Factored {
    length_scale: f64,
    cholesky: Cholesky<f64, Dyn>,
    alpha: DVector<f64>,
    lml: f64,
}

fn rbf(a: f64, b: f64, length_scale: f64, signal_variance: f64) -> f64 {
    let d = (a - b) / length_scale;
    signal_variance * (-0.5 * d * d).exp()
}

/// Factor `K + σₙ²I` for `length_scale`; `None` if not positive definite.
fn factor(x: &[f64], y: &DVector<f64>, length_scale: f64, config: &GpConfig) -> Option<Factored> {
    let n = x.len();
    let k = DMatrix::from_fn(n, n, |i, j| {
        let kij = rbf(x[i], x[j], length_scale, config.signal_variance);
        if i == j {
            kij + config.noise_variance
        } else {
            kij
        }
    });
    let cholesky = Cholesky::new(k)?;
    let alpha = cholesky.solve(y);

    // -½ yᵀα - Σ ln Lᵢᵢ - n/2 ln 2π
    let log_det_half: f64 = cholesky.l_dirty().diagonal().iter().map(|d| d.ln()).sum();
    let lml = -0.5 * y.dot(&alpha) - log_det_half - 0.5 * n as f64 * LN_2PI;
    if !lml.is_finite() {
        return None;
    }

    Some(Factored {
        length_scale,
        cholesky,
        alpha,
        lml,
    })
}

/// `steps` log-uniformly spaced values from `low` to `high` inclusive.
fn log_grid(low: f64, high: f64, steps: usize) -> Vec<f64> {
    let steps = steps.max(2);
    let log_low = low.ln();
    let log_high = high.ln();
    (0..steps)
        .map(|i| {
            let t = i as f64 / (steps - 1) as f64;
            (log_low + t * (log_high - log_low)).exp()
        })
        .collect()
}

/// Population mean and standard deviation; a zero spread maps to 1.
fn mean_and_std(y: &[f64]) -> (f64, f64) {
    let n = y.len() as f64;
    let mean = y.iter().sum::<f64>() / n;
    let var = y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std > 0.0 {
        (mean, std)
    } else {
        (mean, 1.0)
    }
}

fn check_training_data(x: &[f64], y: &[f64]) -> SurrogateResult<()> {
    if x.is_empty() {
        return Err(SurrogateError::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(SurrogateError::LengthMismatch {
            inputs: x.len(),
            outputs: y.len(),
        });
    }
    if let Some((index, &value)) = x
        .iter()
        .chain(y.iter())
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(SurrogateError::NonFiniteInput {
            index: index % x.len(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: f64) -> f64 {
        -(x - 2.0).powi(2)
    }

    #[test]
    fn interpolates_training_points() {
        let x = [-5.0, 0.0, 5.0];
        let y: Vec<f64> = x.iter().map(|&v| quadratic(v)).collect();
        let gp = GaussianProcess::fit(&GpConfig::default(), &x, &y).unwrap();

        let pred = gp.predict(&x).unwrap();
        for (i, (&m, &s)) in pred.mean.iter().zip(&pred.std).enumerate() {
            assert!((m - y[i]).abs() < 1e-3, "mean {m} vs {}", y[i]);
            assert!(s < 5e-2, "std at training point should vanish, got {s}");
        }
    }

    #[test]
    fn uncertainty_grows_away_from_data() {
        let x = [0.0, 1.0];
        let y = [1.0, 2.0];
        let gp = GaussianProcess::fit(&GpConfig::unit_rbf(), &x, &y).unwrap();

        let (_, near) = gp.predict_one(0.5).unwrap();
        let (mean_far, far) = gp.predict_one(8.0).unwrap();
        assert!(far > near);
        // Zero prior mean and unit signal variance far from the data.
        assert!(mean_far.abs() < 1e-6);
        assert!((far - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalized_prior_reverts_to_data_mean() {
        let x = [0.0, 1.0, 2.0];
        let y = [10.0, 12.0, 14.0];
        let config = GpConfig::default().with_length_scale(LengthScale::Fixed(1.0));
        let gp = GaussianProcess::fit(&config, &x, &y).unwrap();

        let (mean_far, _) = gp.predict_one(50.0).unwrap();
        assert!((mean_far - 12.0).abs() < 1e-6);
    }

    #[test]
    fn single_point_fit() {
        let gp = GaussianProcess::fit(&GpConfig::default(), &[3.0], &[-7.0]).unwrap();
        assert_eq!(gp.n_samples(), 1);
        let (m, _) = gp.predict_one(3.0).unwrap();
        assert!((m + 7.0).abs() < 1e-6);
    }

    #[test]
    fn fitted_length_scale_is_on_grid() {
        let x = [-4.0, -2.0, 0.0, 2.0, 4.0];
        let y: Vec<f64> = x.iter().map(|&v: &f64| v.sin()).collect();
        let config = GpConfig::default().with_length_scale(LengthScale::Fitted {
            low: 0.1,
            high: 10.0,
            steps: 21,
        });
        let gp = GaussianProcess::fit(&config, &x, &y).unwrap();

        let grid = log_grid(0.1, 10.0, 21);
        assert!(grid.iter().any(|&l| l == gp.length_scale()));
        assert!(gp.log_marginal_likelihood().is_finite());
    }

    #[test]
    fn rejects_bad_training_data() {
        let config = GpConfig::default();
        assert!(matches!(
            GaussianProcess::fit(&config, &[], &[]),
            Err(SurrogateError::EmptyTrainingSet)
        ));
        assert!(matches!(
            GaussianProcess::fit(&config, &[1.0, 2.0], &[1.0]),
            Err(SurrogateError::LengthMismatch {
                inputs: 2,
                outputs: 1
            })
        ));
        assert!(matches!(
            GaussianProcess::fit(&config, &[1.0, 2.0], &[1.0, f64::NAN]),
            Err(SurrogateError::NonFiniteInput { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_non_finite_prediction_input() {
        let gp = GaussianProcess::fit(&GpConfig::unit_rbf(), &[0.0, 1.0], &[0.0, 1.0]).unwrap();
        assert!(matches!(
            gp.predict(&[0.5, f64::INFINITY]),
            Err(SurrogateError::NonFiniteInput { index: 1, .. })
        ));
    }

    #[test]
    fn config_validation() {
        assert!(GpConfig::default().validate().is_ok());
        assert!(GpConfig::default().with_noise_variance(-1.0).validate().is_err());
        assert!(GpConfig::default()
            .with_length_scale(LengthScale::Fixed(0.0))
            .validate()
            .is_err());
        assert!(GpConfig::default()
            .with_length_scale(LengthScale::Fitted {
                low: 2.0,
                high: 1.0,
                steps: 5
            })
            .validate()
            .is_err());
    }

    #[test]
    fn config_json_round_trip() {
        let config = GpConfig::unit_rbf().with_noise_variance(1e-6);
        let json = config.to_json().unwrap();
        let back = GpConfig::from_json(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn fit_through_builder_trait() {
        let config = GpConfig::unit_rbf();
        let gp = SurrogateBuilder::fit(&config, &[0.0, 2.0], &[1.0, -1.0]).unwrap();
        assert_eq!(gp.training_inputs(), &[0.0, 2.0]);
        assert_eq!(gp.length_scale(), 1.0);
    }
}
