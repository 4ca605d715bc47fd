//! The sequential optimization loop.
//!
//! Each iteration refits the surrogate on every observation so far, picks
//! the point of maximum expected improvement inside the bounds, evaluates
//! the true objective there and folds the result into the running maximum.
//! Collaborators (surrogate builder, minimizer) are owned by the
//! [`BayesOptimizer`] value; nothing is shared between runs.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use bopt_surrogate::{GaussianProcess, GpConfig, Surrogate, SurrogateBuilder};
use bopt_types::{validation_error, BoResult, Bounds, ObservationSet, SurrogateError};

use crate::acquisition::expected_improvement;
use crate::design::InitialDesign;
use crate::minimizer::{BoundedBrent, ScalarMinimizer};
use crate::objective::{evaluate_checked, evaluate_one_checked, Objective};
use crate::run::{BayesOptOutcome, IterationRecord, RunSummary};

/// Where the initial running maximum comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncumbentSource {
    /// Largest surrogate prediction at the seed points. Smooths over noisy
    /// seed evaluations.
    #[default]
    ModelPrediction,
    /// Largest raw objective value at the seed points.
    Observed,
}

/// Settings for one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesOptConfig {
    /// Number of loop iterations; the run always performs exactly this many.
    pub n_iter: usize,
    /// Interval the next query point is chosen from.
    pub bounds: Bounds,
    pub incumbent: IncumbentSource,
    /// Re-query the objective at every known point after each iteration
    /// before refitting. When false the stored values are reused.
    pub reevaluate_known_points: bool,
}

impl Default for BayesOptConfig {
    fn default() -> Self {
        Self {
            n_iter: 10,
            bounds: Bounds::default(),
            incumbent: IncumbentSource::default(),
            reevaluate_known_points: true,
        }
    }
}

impl BayesOptConfig {
    pub fn new(n_iter: usize, bounds: Bounds) -> Self {
        Self {
            n_iter,
            bounds,
            ..Self::default()
        }
    }

    pub fn with_incumbent(mut self, incumbent: IncumbentSource) -> Self {
        self.incumbent = incumbent;
        self
    }

    pub fn with_reevaluation(mut self, reevaluate: bool) -> Self {
        self.reevaluate_known_points = reevaluate;
        self
    }

    pub fn from_json(json: &str) -> BoResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> BoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A configured optimizer: run settings plus the surrogate builder and the
/// bounded minimizer used to maximize the acquisition.
#[derive(Debug, Clone)]
pub struct BayesOptimizer<B = GpConfig, M = BoundedBrent> {
    config: BayesOptConfig,
    surrogate: B,
    minimizer: M,
}

impl BayesOptimizer {
    /// Gaussian-process surrogate and Brent's bounded method, both with
    /// default settings.
    pub fn new(config: BayesOptConfig) -> Self {
        Self::with_collaborators(config, GpConfig::default(), BoundedBrent::default())
    }
}

impl<B, M> BayesOptimizer<B, M>
where
    B: SurrogateBuilder,
    M: ScalarMinimizer,
{
    pub fn with_collaborators(config: BayesOptConfig, surrogate: B, minimizer: M) -> Self {
        Self {
            config,
            surrogate,
            minimizer,
        }
    }

    pub fn config(&self) -> &BayesOptConfig {
        &self.config
    }

    /// Seed the run with the points of `design` over the configured bounds.
    pub fn run_with_design<O>(
        &self,
        design: &InitialDesign,
        fun: &O,
    ) -> BoResult<BayesOptOutcome<B::Model>>
    where
        O: Objective + ?Sized,
    {
        let points = design.points(self.config.bounds);
        self.run(&points, fun)
    }

    /// Run `n_iter` iterations starting from `known_points`.
    pub fn run<O>(&self, known_points: &[f64], fun: &O) -> BoResult<BayesOptOutcome<B::Model>>
    where
        O: Objective + ?Sized,
    {
        let bounds = self.config.bounds;
        let n_iter = self.config.n_iter;

        if known_points.is_empty() {
            return Err(validation_error!(
                "at least one known point is required to fit the surrogate"
            ));
        }
        if let Some(x) = known_points.iter().find(|x| !x.is_finite()) {
            return Err(validation_error!("known point {} is not finite", x));
        }
        for x in known_points.iter().filter(|&&x| !bounds.contains(x)) {
            warn!("Known point {} lies outside the search bounds {}", x, bounds);
        }

        let mut summary = RunSummary::new(known_points.len(), n_iter);
        info!(
            "Starting Bayesian optimization run {}: {} known points, {} iterations over {}",
            summary.id,
            known_points.len(),
            n_iter,
            bounds
        );

        let initial_values = evaluate_checked(fun, known_points)?;
        let mut observations =
            ObservationSet::from_parts(known_points.to_vec(), initial_values.clone())?;
        let mut recorded_values = initial_values;

        let mut model = self.surrogate.fit(observations.xs(), observations.ys())?;
        let mut running_max = self.initial_running_max(&model, &observations)?;
        summary.set_initial_running_max(running_max);

        let mut best_so_far = Vec::with_capacity(n_iter + 1);
        best_so_far.push(running_max);
        let mut iterations = Vec::with_capacity(n_iter);

        for iteration in 0..n_iter {
            let (xnew, ei, minimizer_evaluations) = self.next_point(&model, running_max)?;

            let ynew = evaluate_one_checked(fun, xnew)?;
            running_max = running_max.max(ynew);

            observations.push(xnew, ynew);
            recorded_values.push(running_max);

            if self.config.reevaluate_known_points {
                let ys = evaluate_checked(fun, observations.xs())?;
                observations.replace_values(ys)?;
            }

            model = self.surrogate.fit(observations.xs(), observations.ys())?;

            let record = IterationRecord {
                iteration,
                x: xnew,
                y: ynew,
                expected_improvement: ei,
                running_max,
                minimizer_evaluations,
            };
            debug!(
                "Iteration {}: x={:.6}, y={:.6}, ei={:.6e}, running_max={:.6} ({} acquisition evaluations)",
                iteration, xnew, ynew, ei, running_max, minimizer_evaluations
            );
            summary.record_iteration(&record);
            iterations.push(record);
            best_so_far.push(running_max);
        }

        summary.mark_completed();
        let (known_points, observed_values) = observations.into_parts();

        let outcome = BayesOptOutcome {
            running_max,
            known_points,
            recorded_values,
            observed_values,
            best_so_far,
            iterations,
            model,
            summary,
        };

        match outcome.best_observation() {
            Some(best) => info!(
                "Run {} completed: running_max={:.6}, best observed f({:.6}) = {:.6}",
                outcome.summary.id, outcome.running_max, best.x, best.y
            ),
            None => info!(
                "Run {} completed: running_max={:.6}",
                outcome.summary.id, outcome.running_max
            ),
        }

        Ok(outcome)
    }

    fn initial_running_max(
        &self,
        model: &B::Model,
        observations: &ObservationSet,
    ) -> BoResult<f64> {
        let value = match self.config.incumbent {
            IncumbentSource::ModelPrediction => model.predict(observations.xs())?.max_mean(),
            IncumbentSource::Observed => observations.best().map(|obs| obs.y),
        };
        value.ok_or_else(|| validation_error!("no observations to seed the running maximum"))
    }

    /// Maximize expected improvement over the bounds by minimizing its
    /// negation. Returns `(x, ei(x), evaluations)`.
    fn next_point(&self, model: &B::Model, running_max: f64) -> BoResult<(f64, f64, usize)> {
        let mut surrogate_failure: Option<SurrogateError> = None;

        let search = self.minimizer.minimize(
            |x| match expected_improvement(x, running_max, model) {
                Ok(ei) => -ei,
                Err(e) => {
                    if surrogate_failure.is_none() {
                        surrogate_failure = Some(e);
                    }
                    // Non-finite values stop the minimizer; the surrogate
                    // error is reported instead of the minimizer's.
                    f64::NAN
                }
            },
            self.config.bounds,
        );

        if let Some(e) = surrogate_failure {
            return Err(e.into());
        }
        let found = search?;
        Ok((found.x, -found.fun, found.evaluations))
    }
}

/// Maximize `fun` over `bounds` with the default Gaussian-process surrogate
/// and Brent's bounded method, starting from `known_points`.
///
/// The returned outcome's [`into_parts`](BayesOptOutcome::into_parts) gives
/// `(running_max, known_points, recorded_values, model)`.
pub fn bayes_opt<O>(
    known_points: &[f64],
    fun: &O,
    n_iter: usize,
    bounds: Bounds,
) -> BoResult<BayesOptOutcome<GaussianProcess>>
where
    O: Objective + ?Sized,
{
    BayesOptimizer::new(BayesOptConfig::new(n_iter, bounds)).run(known_points, fun)
}
