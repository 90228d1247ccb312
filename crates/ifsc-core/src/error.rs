//! Error types for IFSC Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
