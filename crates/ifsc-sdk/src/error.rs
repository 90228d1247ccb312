//! Shortcode error types
//!
//! Errors are collected while a tag is compiled and evaluated, never raised
//! to the caller. Messages quote attributes in backticks; the debug block
//! renders those spans as `<code>`.

use thiserror::Error;

/// A problem with one `[if]` invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShortcodeError {
    /// An attribute needs an option that is turned off
    #[error(
        "{}`[{tag}]` shortcode attribute `{attribute}=\"{value}\"` is not enabled via plugin options.",
        arbitrary_prefix(.arbitrary)
    )]
    FeatureDisabled {
        tag: String,
        attribute: String,
        value: String,
        arbitrary: bool,
    },

    /// Arbitrary attribute missing from a non-empty whitelist
    #[error("Arbitrary `[{tag}]` shortcode attribute `{attribute}=\"{value}\"` is not whitelisted via plugin options.")]
    NotWhitelisted {
        tag: String,
        attribute: String,
        value: String,
    },

    /// Arbitrary attribute name outside the identifier pattern
    #[error(
        "Arbitrary `[{tag}]` shortcode attribute `{attribute}=\"{value}\"` contains invalid chars in the attribute name. Must match: `^[a-z][a-z0-9_]*[a-z0-9]$` with at least {min_length} chars."
    )]
    InvalidAttributeName {
        tag: String,
        attribute: String,
        value: String,
        min_length: usize,
    },

    /// Attribute value rejected by the expression grammar
    #[error("`[{tag}]` shortcode attribute contains an invalid (or imbalanced) expression: `{attribute}=\"{value}\"` ({reason})")]
    InvalidExpression {
        tag: String,
        attribute: String,
        value: String,
        reason: String,
    },

    /// The condition failed while being evaluated
    #[error("{0}")]
    EvaluationFailure(String),

    /// Attribute written without `=""`
    #[error("`[{tag}]` shortcode attribute `{value}`, by itself, without `=\"\"`, is not supported. Instead, use `{value}=\"true\"`. Consult the shortcode documentation for assistance.")]
    UnsupportedBareAttribute { tag: String, value: String },
}

fn arbitrary_prefix(arbitrary: &bool) -> &'static str {
    if *arbitrary {
        "Arbitrary "
    } else {
        ""
    }
}

impl From<ifsc_runtime::RuntimeError> for ShortcodeError {
    fn from(err: ifsc_runtime::RuntimeError) -> Self {
        ShortcodeError::EvaluationFailure(err.to_string())
    }
}

/// Result type for shortcode operations
pub type Result<T> = std::result::Result<T, ShortcodeError>;
