//! Error types for wrapping, conversion and argument binding.

use thiserror::Error;

/// Errors surfaced by a wrapped callable or the wrapping constructor.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected at wrap time: the declared parameter list cannot describe a callable.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Default-type-driven or fallback conversion of an environment value failed.
    #[error("Invalid environment value for parameter '{param}': {source}")]
    Conversion {
        param: String,
        #[source]
        source: ConversionError,
    },

    #[error("got multiple values for argument '{0}'")]
    DuplicateArgument(String),

    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    #[error("got an unexpected keyword argument '{0}'")]
    UnexpectedKeyword(String),

    #[error("takes {expected} positional arguments but {given} were given")]
    TooManyPositional { expected: usize, given: usize },

    /// Logging or settings setup failed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A one-argument converter could not build a value from a raw string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {value:?} to {target}: {reason}")]
pub struct ConversionError {
    /// Name of the converter that failed (`int`, `float`, a custom name...).
    pub target: String,
    pub value: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(target: impl Into<String>, value: &str, reason: impl ToString) -> Self {
        Self {
            target: target.into(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}
