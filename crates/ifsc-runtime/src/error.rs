//! Runtime error types

use thiserror::Error;

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Function name not present in the registry
    #[error("Call to undefined function {0}()")]
    UndefinedFunction(String),

    /// Wrong number or type of arguments
    #[error("{function}() expects {expected}")]
    InvalidArguments { function: String, expected: String },

    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// The product catalog could not answer a query
    #[error("Commerce lookup failed: {0}")]
    LookupFailed(String),
}

impl RuntimeError {
    pub(crate) fn arguments(function: &str, expected: &str) -> Self {
        RuntimeError::InvalidArguments {
            function: function.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
