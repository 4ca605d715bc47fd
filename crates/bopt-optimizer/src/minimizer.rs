//! Bounded scalar minimization.
//!
//! [`BoundedBrent`] is Brent's method restricted to a closed interval:
//! golden-section steps, switching to parabolic interpolation through the
//! three best points whenever that step is acceptable. Every trial point is
//! strictly interior to the interval.

use serde::{Deserialize, Serialize};

use bopt_types::{Bounds, MinimizerError};

/// `(3 - √5) / 2`
const GOLDEN: f64 = 0.381_966_011_250_105_1;
/// `√(2.2e-16)`
const SQRT_EPS: f64 = 1.483_239_697_419_132_6e-8;

/// Result of a bounded minimization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinimizeOutcome {
    /// Located minimizer.
    pub x: f64,
    /// Function value at `x`.
    pub fun: f64,
    /// Number of function evaluations spent.
    pub evaluations: usize,
}

/// Finds a point in `bounds` minimizing a scalar function.
pub trait ScalarMinimizer {
    fn minimize<F>(&self, f: F, bounds: Bounds) -> Result<MinimizeOutcome, MinimizerError>
    where
        F: FnMut(f64) -> f64;
}

/// Brent's bounded method, optionally restarted on equal sub-intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundedBrent {
    /// Absolute tolerance on the located point.
    pub xatol: f64,
    /// Evaluation budget per sub-interval.
    pub max_evaluations: usize,
    /// Number of equal sub-intervals searched independently; the lowest
    /// result wins, leftmost on ties.
    pub partitions: usize,
}

impl Default for BoundedBrent {
    fn default() -> Self {
        Self {
            xatol: 1e-5,
            max_evaluations: 500,
            partitions: 1,
        }
    }
}

impl BoundedBrent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_xatol(mut self, xatol: f64) -> Self {
        self.xatol = xatol;
        self
    }

    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    pub fn with_partitions(mut self, n: usize) -> Self {
        self.partitions = n;
        self
    }
}

impl ScalarMinimizer for BoundedBrent {
    fn minimize<F>(&self, mut f: F, bounds: Bounds) -> Result<MinimizeOutcome, MinimizerError>
    where
        F: FnMut(f64) -> f64,
    {
        let mut best: Option<MinimizeOutcome> = None;
        let mut evaluations = 0;

        for piece in bounds.split(self.partitions) {
            let found = brent_bounded(&mut f, piece, self.xatol, self.max_evaluations)?;
            evaluations += found.evaluations;
            best = match best {
                Some(b) if b.fun <= found.fun => Some(b),
                _ => Some(found),
            };
        }

        // `split` always yields at least one piece.
        best.map(|b| MinimizeOutcome { evaluations, ..b })
            .ok_or(MinimizerError::InvalidBounds {
                lo: bounds.lo(),
                hi: bounds.hi(),
            })
    }
}

fn call<F: FnMut(f64) -> f64>(
    f: &mut F,
    x: f64,
    evaluations: &mut usize,
) -> Result<f64, MinimizerError> {
    *evaluations += 1;
    let value = f(x);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MinimizerError::NonFiniteValue { x, value })
    }
}

/// Sign of `v`, with zero mapped to `+1`.
fn sign_or_one(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn brent_bounded<F: FnMut(f64) -> f64>(
    f: &mut F,
    bounds: Bounds,
    xatol: f64,
    max_evaluations: usize,
) -> Result<MinimizeOutcome, MinimizerError> {
    let (mut a, mut b) = (bounds.lo(), bounds.hi());
    let mut evaluations = 0;

    // xf: best point so far; nfc: second best; fulc: previous second best.
    let mut fulc = a + GOLDEN * (b - a);
    let (mut nfc, mut xf) = (fulc, fulc);
    let mut rat: f64 = 0.0;
    let mut e: f64 = 0.0;

    let mut fx = call(f, xf, &mut evaluations)?;
    let (mut ffulc, mut fnfc) = (fx, fx);

    let mut xm = 0.5 * (a + b);
    let mut tol1 = SQRT_EPS * xf.abs() + xatol / 3.0;
    let mut tol2 = 2.0 * tol1;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        if evaluations >= max_evaluations {
            return Err(MinimizerError::NotConverged { evaluations, x: xf });
        }

        let mut golden = true;

        if e.abs() > tol1 {
            // Try a parabola through (xf, nfc, fulc).
            golden = false;
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                rat = p / q;
                let x = xf + rat;
                // Never evaluate too close to an end of the bracket.
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * sign_or_one(xm - xf);
                }
            } else {
                golden = true;
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = GOLDEN * e;
        }

        let x = xf + sign_or_one(rat) * rat.abs().max(tol1);
        let fu = call(f, x, &mut evaluations)?;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = SQRT_EPS * xf.abs() + xatol / 3.0;
        tol2 = 2.0 * tol1;
    }

    Ok(MinimizeOutcome {
        x: xf,
        fun: fx,
        evaluations,
    })
}
