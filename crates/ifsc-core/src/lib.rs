//! IFSC Core - Core types and definitions for the `[if]` shortcode engine
//!
//! This crate provides the fundamental types used across the IFSC crates:
//! - Value types for runtime data
//! - AST (Abstract Syntax Tree) definitions for compiled conditions
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{Expression, LogicalGroupOp, Operator, Predicate, UnaryOperator};
pub use error::CoreError;
pub use types::Value;
