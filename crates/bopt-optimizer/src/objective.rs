//! The true objective being maximized.
//!
//! Any `Fn(f64) -> f64` closure is an [`Objective`]. [`Fallible`] adapts
//! closures that can fail, and [`Vectorized`] adapts closures that evaluate a
//! whole slice at once and must return one value per input.

use bopt_types::ObjectiveError;

/// A scalar function that can be evaluated at one point or at many.
pub trait Objective {
    fn evaluate(&self, x: f64) -> Result<f64, ObjectiveError>;

    /// Evaluate at every point of `xs`, in order.
    fn evaluate_many(&self, xs: &[f64]) -> Result<Vec<f64>, ObjectiveError> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }
}

impl<F> Objective for F
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> Result<f64, ObjectiveError> {
        Ok(self(x))
    }
}

/// Wraps `Fn(f64) -> Result<f64, E>`; failures surface as
/// [`ObjectiveError::Failed`] carrying the point and the original error.
#[derive(Debug, Clone, Copy)]
pub struct Fallible<F>(pub F);

impl<F, E> Objective for Fallible<F>
where
    F: Fn(f64) -> Result<f64, E>,
    E: std::error::Error + Send + Sync + 'static,
{
    fn evaluate(&self, x: f64) -> Result<f64, ObjectiveError> {
        (self.0)(x).map_err(|e| ObjectiveError::Failed {
            x,
            source: Box::new(e),
        })
    }
}

/// Wraps a slice-in, vec-out function and checks the output shape.
#[derive(Debug, Clone, Copy)]
pub struct Vectorized<F>(pub F);

impl<F> Objective for Vectorized<F>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    fn evaluate(&self, x: f64) -> Result<f64, ObjectiveError> {
        let ys = self.evaluate_many(&[x])?;
        ys.first()
            .copied()
            .ok_or(ObjectiveError::ShapeMismatch {
                expected: 1,
                actual: 0,
            })
    }

    fn evaluate_many(&self, xs: &[f64]) -> Result<Vec<f64>, ObjectiveError> {
        let ys = (self.0)(xs);
        if ys.len() != xs.len() {
            return Err(ObjectiveError::ShapeMismatch {
                expected: xs.len(),
                actual: ys.len(),
            });
        }
        Ok(ys)
    }
}

/// Evaluate `fun` at `xs`, rejecting any non-finite value.
pub(crate) fn evaluate_checked<O>(fun: &O, xs: &[f64]) -> Result<Vec<f64>, ObjectiveError>
where
    O: Objective + ?Sized,
{
    let ys = fun.evaluate_many(xs)?;
    if ys.len() != xs.len() {
        return Err(ObjectiveError::ShapeMismatch {
            expected: xs.len(),
            actual: ys.len(),
        });
    }
    if let Some((&x, &value)) = xs.iter().zip(&ys).find(|(_, y)| !y.is_finite()) {
        return Err(ObjectiveError::NonFinite { x, value });
    }
    Ok(ys)
}

/// Evaluate `fun` at a single point, rejecting a non-finite value.
pub(crate) fn evaluate_one_checked<O>(fun: &O, x: f64) -> Result<f64, ObjectiveError>
where
    O: Objective + ?Sized,
{
    let value = fun.evaluate(x)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ObjectiveError::NonFinite { x, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct OutOfDomain;

    impl std::fmt::Display for OutOfDomain {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "log of a non-positive number")
        }
    }

    impl std::error::Error for OutOfDomain {}

    #[test]
    fn closures_are_objectives() {
        let f = |x: f64| x * x;
        assert_eq!(f.evaluate(3.0).unwrap(), 9.0);
        assert_eq!(f.evaluate_many(&[1.0, -2.0]).unwrap(), vec![1.0, 4.0]);
    }

    #[test]
    fn fallible_keeps_point_and_source() {
        let f = Fallible(|x: f64| if x > 0.0 { Ok(x.ln()) } else { Err(OutOfDomain) });
        assert_eq!(f.evaluate(1.0).unwrap(), 0.0);

        match f.evaluate_many(&[1.0, -1.0, 2.0]) {
            Err(ObjectiveError::Failed { x, source }) => {
                assert_eq!(x, -1.0);
                assert_eq!(source.to_string(), "log of a non-positive number");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn vectorized_checks_shape() {
        let good = Vectorized(|xs: &[f64]| -> Vec<f64> { xs.iter().map(|x| x + 1.0).collect() });
        assert_eq!(good.evaluate(1.0).unwrap(), 2.0);
        assert_eq!(good.evaluate_many(&[0.0, 1.0]).unwrap(), vec![1.0, 2.0]);

        let truncating =
            Vectorized(|xs: &[f64]| -> Vec<f64> { xs.iter().skip(1).copied().collect() });
        assert!(matches!(
            truncating.evaluate_many(&[0.0, 1.0, 2.0]),
            Err(ObjectiveError::ShapeMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(matches!(
            truncating.evaluate(5.0),
            Err(ObjectiveError::ShapeMismatch {
                expected: 1,
                actual: 0
            })
        ));
    }

    #[test]
    fn checked_evaluation_rejects_non_finite() {
        let f = |x: f64| 1.0 / x;
        assert!(matches!(
            evaluate_checked(&f, &[1.0, 0.0]),
            Err(ObjectiveError::NonFinite { x, .. }) if x == 0.0
        ));
        assert!(matches!(
            evaluate_one_checked(&f, 0.0),
            Err(ObjectiveError::NonFinite { .. })
        ));
        assert_eq!(evaluate_one_checked(&f, 4.0).unwrap(), 0.25);
    }
}
