//! # bopt-optimizer
//!
//! Sequential Bayesian optimization of one-dimensional black-box functions.
//!
//! A run starts from a handful of evaluated seed points, fits a surrogate
//! model to them, and then repeatedly queries the objective where the
//! expected improvement over the best value seen so far is largest.
//!
//! ```no_run
//! use bopt_optimizer::{bayes_opt, Bounds};
//!
//! let bounds = Bounds::new(-10.0, 10.0)?;
//! let outcome = bayes_opt(&[-5.0, 0.0, 5.0], &|x: f64| -(x - 2.0).powi(2), 5, bounds)?;
//! println!("best value found: {}", outcome.running_max);
//! # Ok::<(), bopt_optimizer::BoError>(())
//! ```

mod acquisition;
mod design;
mod driver;
mod minimizer;
mod objective;
mod run;

pub use acquisition::{expected_improvement, expected_improvement_from_moments};
pub use design::{grid_points, random_points, InitialDesign};
pub use driver::{bayes_opt, BayesOptConfig, BayesOptimizer, IncumbentSource};
pub use minimizer::{BoundedBrent, MinimizeOutcome, ScalarMinimizer};
pub use objective::{Fallible, Objective, Vectorized};
pub use run::{BayesOptOutcome, IterationRecord, RunId, RunSummary};

pub use bopt_surrogate::{GaussianProcess, GpConfig, LengthScale, Prediction, Surrogate};
pub use bopt_types::{BoError, BoResult, Bounds, Observation, ObservationSet};
