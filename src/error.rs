//! Error types for the aif-control crate

use thiserror::Error;

/// Main error type for the aif-control crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: String,
        expected: String,
        got: String,
    },

    #[error("{what} must not be empty")]
    Empty { what: String },

    #[error("{kind} {owner} depends on factor {index}, but the model has {num_factors} factors")]
    DependencyOutOfRange {
        kind: String,
        owner: usize,
        index: usize,
        num_factors: usize,
    },

    #[error("{kind} {owner} lists factor {index} more than once")]
    DuplicateDependency {
        kind: String,
        owner: usize,
        index: usize,
    },

    #[error("policy {policy} uses action {action} on factor {factor} at t={timestep}, but only {num_controls} actions exist")]
    ActionOutOfRange {
        policy: usize,
        timestep: usize,
        factor: usize,
        action: usize,
        num_controls: usize,
    },

    #[error("policies control {policy_factors} factors but the model has {model_factors}")]
    FactorCountMismatch {
        policy_factors: usize,
        model_factors: usize,
    },

    #[error("habit prior has {got} entries but there are {expected} policies")]
    HabitLengthMismatch { expected: usize, got: usize },

    #[error("{input} is required when {feature} is enabled")]
    MissingInput { input: String, feature: String },

    #[error("unsupported action selection mode '{input}'. Expected one of: {expected}")]
    UnsupportedActionSelection { input: String, expected: String },

    #[error("{feature} is not implemented")]
    UnsupportedFeature { feature: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("belief for factor {factor} is not a probability vector (sum = {sum})")]
    InvalidBelief { factor: usize, sum: f64 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("tensor reshape failed: {0}")]
    Tensor(#[from] ndarray::ShapeError),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn shape(
        context: impl Into<String>,
        expected: impl std::fmt::Debug,
        got: impl std::fmt::Debug,
    ) -> Self {
        Error::ShapeMismatch {
            context: context.into(),
            expected: format!("{expected:?}"),
            got: format!("{got:?}"),
        }
    }
}
