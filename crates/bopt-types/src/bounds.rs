use serde::{Deserialize, Serialize};

use crate::errors::{BoError, BoResult};

/// Closed search interval `[lo, hi]` for the next query point.
///
/// Always finite with `lo < hi`; both constructors and deserialization
/// enforce this.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Bounds {
    lo: f64,
    hi: f64,
}

impl Bounds {
    pub fn new(lo: f64, hi: f64) -> BoResult<Self> {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(BoError::Validation(format!(
                "bounds must be finite, got ({lo}, {hi})"
            )));
        }
        if lo >= hi {
            return Err(BoError::Validation(format!(
                "lower bound {lo} must be strictly below upper bound {hi}"
            )));
        }
        Ok(Self { lo, hi })
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lo && x <= self.hi
    }

    /// Split into `n` equal, adjacent sub-intervals (`n = 0` is treated as 1).
    pub fn split(&self, n: usize) -> Vec<Bounds> {
        let n = n.max(1);
        let step = self.width() / n as f64;
        (0..n)
            .map(|i| {
                let lo = self.lo + step * i as f64;
                // Last piece ends exactly on `hi` regardless of rounding.
                let hi = if i + 1 == n { self.hi } else { lo + step };
                Bounds { lo, hi }
            })
            .collect()
    }
}

/// The interval searched when the caller gives none.
impl Default for Bounds {
    fn default() -> Self {
        Self {
            lo: -10.0,
            hi: 10.0,
        }
    }
}

impl TryFrom<(f64, f64)> for Bounds {
    type Error = BoError;

    fn try_from((lo, hi): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lo, hi)
    }
}

impl From<Bounds> for (f64, f64) {
    fn from(bounds: Bounds) -> Self {
        (bounds.lo, bounds.hi)
    }
}

impl std::fmt::Display for Bounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
