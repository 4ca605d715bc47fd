//! The surrogate contract: fit on observations, predict mean and uncertainty.

use bopt_types::SurrogateError;

pub type SurrogateResult<T> = Result<T, SurrogateError>;

/// Predicted means and standard deviations, one entry per queried input.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl Prediction {
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Largest predicted mean, `None` when empty.
    pub fn max_mean(&self) -> Option<f64> {
        self.mean.iter().copied().reduce(f64::max)
    }
}

/// A fitted probabilistic regressor over scalar inputs.
pub trait Surrogate {
    /// Predict mean and standard deviation at each input.
    fn predict(&self, x: &[f64]) -> SurrogateResult<Prediction>;

    /// Number of samples the model was trained on.
    fn n_samples(&self) -> usize;

    /// Predict `(mean, std)` at a single input.
    fn predict_one(&self, x: f64) -> SurrogateResult<(f64, f64)> {
        let prediction = self.predict(&[x])?;
        match (prediction.mean.first(), prediction.std.first()) {
            (Some(&mean), Some(&std)) => Ok((mean, std)),
            _ => Err(SurrogateError::LengthMismatch {
                inputs: 1,
                outputs: prediction.mean.len().min(prediction.std.len()),
            }),
        }
    }
}

/// Produces a freshly fitted [`Surrogate`] from training data.
///
/// Every call yields an independent model; nothing is mutated in place.
pub trait SurrogateBuilder {
    type Model: Surrogate;

    fn fit(&self, x: &[f64], y: &[f64]) -> SurrogateResult<Self::Model>;
}

impl<S: Surrogate + ?Sized> Surrogate for Box<S> {
    fn predict(&self, x: &[f64]) -> SurrogateResult<Prediction> {
        (**self).predict(x)
    }

    fn n_samples(&self) -> usize {
        (**self).n_samples()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Flat;

    impl Surrogate for Flat {
        fn predict(&self, x: &[f64]) -> SurrogateResult<Prediction> {
            Ok(Prediction {
                mean: x.iter().map(|v| v * 2.0).collect(),
                std: vec![0.5; x.len()],
            })
        }

        fn n_samples(&self) -> usize {
            0
        }
    }

    #[test]
    fn predict_one_unwraps_single_entry() {
        assert_eq!(Flat.predict_one(3.0).unwrap(), (6.0, 0.5));
    }

    struct Silent;

    impl Surrogate for Silent {
        fn predict(&self, _x: &[f64]) -> SurrogateResult<Prediction> {
            Ok(Prediction {
                mean: Vec::new(),
                std: Vec::new(),
            })
        }

        fn n_samples(&self) -> usize {
            3
        }
    }

    #[test]
    fn predict_one_reports_missing_output_as_length_mismatch() {
        assert!(matches!(
            Silent.predict_one(1.0),
            Err(SurrogateError::LengthMismatch {
                inputs: 1,
                outputs: 0
            })
        ));
    }

    #[test]
    fn boxed_surrogate_delegates() {
        let boxed: Box<dyn Surrogate> = Box::new(Flat);
        assert_eq!(boxed.predict_one(-1.0).unwrap(), (-2.0, 0.5));
    }

    #[test]
    fn max_mean_of_prediction() {
        let p = Prediction {
            mean: vec![-3.0, 4.5, 1.0],
            std: vec![0.1; 3],
        };
        assert_eq!(p.max_mean(), Some(4.5));
        assert_eq!(p.len(), 3);
    }
}
