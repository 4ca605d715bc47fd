//! # bopt-surrogate
//!
//! Probabilistic surrogate models for bopt.
//!
//! Defines the fit/predict contract the optimization driver relies on
//! ([`SurrogateBuilder`] produces a fitted [`Surrogate`]) and ships a
//! one-dimensional Gaussian process regressor with an RBF kernel whose
//! length scale can be fixed or selected by log marginal likelihood.

mod gp;
mod model;

pub use gp::{GaussianProcess, GpConfig, LengthScale};
pub use model::{Prediction, Surrogate, SurrogateBuilder, SurrogateResult};
