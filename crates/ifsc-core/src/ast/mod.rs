//! Abstract Syntax Tree (AST) definitions for compiled `[if]` conditions
//!
//! Every attribute of an `[if]` tag compiles into an [`Expression`] tree.
//! The tree is closed: it can only describe literals, comparisons, boolean
//! connectives and calls to named predicates, so evaluating it never runs
//! author-supplied code.

pub mod expression;
pub mod operator;
pub mod predicate;

pub use expression::{Expression, LogicalGroupOp, UnaryOperator};
pub use operator::Operator;
pub use predicate::Predicate;
