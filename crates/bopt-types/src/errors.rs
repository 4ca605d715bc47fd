use thiserror::Error;

/// Main error type for a bopt optimization run
#[derive(Error, Debug)]
pub enum BoError {
    #[error("Surrogate error: {0}")]
    Surrogate(#[from] SurrogateError),

    #[error("Minimizer error: {0}")]
    Minimizer(#[from] MinimizerError),

    #[error("Objective error: {0}")]
    Objective(#[from] ObjectiveError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Surrogate-model errors (fit and predict)
#[derive(Error, Debug)]
pub enum SurrogateError {
    #[error("Cannot fit a surrogate on an empty training set")]
    EmptyTrainingSet,

    #[error("Training data length mismatch: {inputs} inputs, {outputs} outputs")]
    LengthMismatch { inputs: usize, outputs: usize },

    #[error("Non-finite value {value} at training index {index}")]
    NonFiniteInput { index: usize, value: f64 },

    #[error("Kernel matrix is not positive definite (length scale {length_scale})")]
    NotPositiveDefinite { length_scale: f64 },

    #[error("Invalid hyperparameter {name}: {value}")]
    InvalidHyperparameter { name: String, value: f64 },
}

/// Bounded scalar minimizer errors
#[derive(Error, Debug)]
pub enum MinimizerError {
    #[error("Invalid bounds: lower {lo} must be finite and below upper {hi}")]
    InvalidBounds { lo: f64, hi: f64 },

    #[error("Minimizer did not converge after {evaluations} evaluations (last x = {x})")]
    NotConverged { evaluations: usize, x: f64 },

    #[error("Function returned non-finite value {value} at x = {x}")]
    NonFiniteValue { x: f64, value: f64 },
}

/// Errors raised while evaluating the true objective
#[derive(Error, Debug)]
pub enum ObjectiveError {
    #[error("Objective failed at x = {x}: {source}")]
    Failed {
        x: f64,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Objective returned non-finite value {value} at x = {x}")]
    NonFinite { x: f64, value: f64 },

    #[error("Objective output shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Result type alias for bopt operations
pub type BoResult<T> = Result<T, BoError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::BoError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::BoError::Config(format!($($arg)*))
    };
}
