//! Observed (point, value) pairs.

use serde::{Deserialize, Serialize};

use crate::errors::{BoError, BoResult};

/// A single evaluation of the true objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
}

/// Ordered, append-only set of observations.
///
/// Inputs and values are stored as parallel columns so they can be handed
/// to a surrogate fit without copying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSet {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(xs: Vec<f64>, ys: Vec<f64>) -> BoResult<Self> {
        if xs.len() != ys.len() {
            return Err(BoError::Validation(format!(
                "observation set needs one value per point: {} points, {} values",
                xs.len(),
                ys.len()
            )));
        }
        Ok(Self { xs, ys })
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.xs.push(x);
        self.ys.push(y);
    }

    /// Replace every stored value, keeping the points.
    pub fn replace_values(&mut self, ys: Vec<f64>) -> BoResult<()> {
        if ys.len() != self.xs.len() {
            return Err(BoError::Validation(format!(
                "expected {} replacement values, got {}",
                self.xs.len(),
                ys.len()
            )));
        }
        self.ys = ys;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.xs
            .iter()
            .zip(&self.ys)
            .map(|(&x, &y)| Observation { x, y })
    }

    /// Observation with the largest value; the earliest one wins ties.
    pub fn best(&self) -> Option<Observation> {
        best_of(self.iter())
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.xs, self.ys)
    }
}

/// Observation with the largest value; the earliest one wins ties.
pub fn best_of<I>(observations: I) -> Option<Observation>
where
    I: IntoIterator<Item = Observation>,
{
    observations.into_iter().fold(None, |best, obs| match best {
        Some(b) if b.y >= obs.y => Some(b),
        _ => Some(obs),
    })
}
