//! Per-run bookkeeping: iteration records, run summary, final outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bopt_types::{best_of, Observation};

/// Unique optimization run identifier.
pub type RunId = Uuid;

/// What happened in one iteration of the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 0-indexed iteration number.
    pub iteration: usize,
    /// Point chosen by maximizing expected improvement.
    pub x: f64,
    /// True objective value at `x`.
    pub y: f64,
    /// Expected improvement at `x` under the model used to choose it.
    pub expected_improvement: f64,
    /// Running maximum after this iteration.
    pub running_max: f64,
    /// Acquisition evaluations spent by the minimizer.
    pub minimizer_evaluations: usize,
}

/// Identity and timing of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: RunId,
    pub n_initial: usize,
    pub n_iter: usize,
    pub initial_running_max: f64,
    pub running_max: f64,
    pub iterations_completed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn new(n_initial: usize, n_iter: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            n_initial,
            n_iter,
            initial_running_max: f64::NEG_INFINITY,
            running_max: f64::NEG_INFINITY,
            iterations_completed: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn set_initial_running_max(&mut self, value: f64) {
        self.initial_running_max = value;
        self.running_max = value;
    }

    /// Record a finished iteration; the running maximum never decreases.
    pub fn record_iteration(&mut self, record: &IterationRecord) {
        self.iterations_completed += 1;
        if record.running_max > self.running_max {
            self.running_max = record.running_max;
        }
    }

    pub fn mark_completed(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn is_completed(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// Everything a run returns.
///
/// `recorded_values` keeps the historical layout: the objective values of
/// the seed points followed by the running maximum after each iteration.
/// `observed_values` holds the true objective value at every point of
/// `known_points`, and `best_so_far` the running maximum before the first
/// iteration and after each one.
#[derive(Debug, Clone)]
pub struct BayesOptOutcome<S> {
    pub running_max: f64,
    pub known_points: Vec<f64>,
    pub recorded_values: Vec<f64>,
    pub observed_values: Vec<f64>,
    pub best_so_far: Vec<f64>,
    pub iterations: Vec<IterationRecord>,
    pub model: S,
    pub summary: RunSummary,
}

impl<S> BayesOptOutcome<S> {
    /// Known point with the largest observed value (earliest on ties).
    pub fn best_observation(&self) -> Option<Observation> {
        best_of(
            self.known_points
                .iter()
                .zip(&self.observed_values)
                .map(|(&x, &y)| Observation { x, y }),
        )
    }

    /// `(running_max, known_points, recorded_values, model)`.
    pub fn into_parts(self) -> (f64, Vec<f64>, Vec<f64>, S) {
        (
            self.running_max,
            self.known_points,
            self.recorded_values,
            self.model,
        )
    }
}
