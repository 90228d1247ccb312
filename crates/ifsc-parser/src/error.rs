//! Parser error types

use ifsc_core::CoreError;
use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Nothing to parse
    #[error("Empty expression")]
    EmptyExpression,

    /// A quoted token is missing its closing quote
    #[error("Unbalanced quotes in: {0}")]
    UnbalancedQuotes(String),

    /// Parentheses do not pair up
    #[error("Unbalanced parentheses in: {0}")]
    UnbalancedParentheses(String),

    /// Character outside of the expression grammar
    #[error("Invalid character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    /// Token in a place the grammar does not allow
    #[error("Unexpected {found} at position {position}")]
    UnexpectedToken { found: String, position: usize },

    /// Input ended while more was expected
    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    /// Grouping, negation or operator chains nest past the limit
    #[error("Expression nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// Invalid operator or literal
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid expression syntax
    #[error("Invalid expression syntax: {0}")]
    InvalidExpression(String),

    /// An attribute callback refused an operand
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
