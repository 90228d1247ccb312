//! Expression AST nodes

use super::operator::Operator;
use super::predicate::Predicate;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Expression AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Literal value
    Literal(Value),

    /// Built-in predicate lookup
    Predicate(Predicate),

    /// Call to a registered function (arbitrary attributes, `php=""` calls)
    FunctionCall { name: String, args: Vec<Expression> },

    /// Binary operation
    Binary {
        left: Box<Expression>,
        op: Operator,
        right: Box<Expression>,
    },

    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },

    /// Logical grouping (any/all conditions)
    LogicalGroup {
        /// Type of logical operation: "any" (OR) or "all" (AND)
        op: LogicalGroupOp,
        /// List of conditions to evaluate
        conditions: Vec<Expression>,
    },
}

/// Logical group operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalGroupOp {
    /// Any condition must be true (OR logic)
    Any,
    /// All conditions must be true (AND logic)
    All,
}

impl LogicalGroupOp {
    /// Connective used when rendering the group
    pub fn connective(&self) -> &'static str {
        match self {
            LogicalGroupOp::Any => "||",
            LogicalGroupOp::All => "&&",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// Logical NOT (!)
    Not,
    /// Arithmetic negation (-)
    Negate,
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a predicate expression
    pub fn predicate(predicate: Predicate) -> Self {
        Expression::Predicate(predicate)
    }

    /// Create a function call expression
    pub fn function_call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    /// Create a binary expression
    pub fn binary(left: Expression, op: Operator, right: Expression) -> Self {
        Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Logical negation
    pub fn not(operand: Expression) -> Self {
        Self::unary(UnaryOperator::Not, operand)
    }

    /// Combine conditions with a logical group.
    ///
    /// A single condition is returned as is; an empty list yields an empty
    /// group, which never holds.
    pub fn group(op: LogicalGroupOp, mut conditions: Vec<Expression>) -> Self {
        if conditions.len() == 1 {
            return conditions.remove(0);
        }
        Expression::LogicalGroup { op, conditions }
    }

    /// Number of leaf nodes (literals, predicates and calls)
    pub fn leaf_count(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Predicate(_) | Expression::FunctionCall { .. } => 1,
            Expression::Binary { left, right, .. } => left.leaf_count() + right.leaf_count(),
            Expression::Unary { operand, .. } => operand.leaf_count(),
            Expression::LogicalGroup { conditions, .. } => {
                conditions.iter().map(Expression::leaf_count).sum()
            }
        }
    }

    /// Height of the tree; a leaf counts as 1
    pub fn depth(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Predicate(_) => 1,
            Expression::FunctionCall { args, .. } => {
                1 + args.iter().map(Expression::depth).max().unwrap_or(0)
            }
            Expression::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expression::Unary { operand, .. } => 1 + operand.depth(),
            Expression::LogicalGroup { conditions, .. } => {
                1 + conditions.iter().map(Expression::depth).max().unwrap_or(0)
            }
        }
    }

    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expression::Binary { .. } | Expression::LogicalGroup { .. }
        )
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compound() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Predicate(predicate) => write!(f, "{}", predicate),
            Expression::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expression::Binary { left, op, right } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f)
            }
            Expression::Unary { op, operand } => {
                match op {
                    UnaryOperator::Not => write!(f, "!")?,
                    UnaryOperator::Negate => write!(f, "-")?,
                }
                operand.fmt_operand(f)
            }
            // Every member is parenthesized, so appended conditions never
            // bind to their neighbours.
            Expression::LogicalGroup { op, conditions } => {
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", op.connective())?;
                    }
                    write!(f, "({})", condition)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn can(cap: &str) -> Expression {
        Expression::predicate(Predicate::UserCan {
            capability: cap.to_string(),
        })
    }

    #[test]
    fn test_literal_expression() {
        let expr = Expression::literal(42.0);
        assert_eq!(expr, Expression::Literal(Value::Number(42.0)));
    }

    #[test]
    fn test_binary_expression() {
        // 1 == 1
        let expr = Expression::binary(
            Expression::literal(1_i64),
            Operator::Eq,
            Expression::literal(1_i64),
        );

        match expr {
            Expression::Binary { left, op, right } => {
                assert_eq!(op, Operator::Eq);
                assert_eq!(*left, Expression::Literal(Value::Number(1.0)));
                assert_eq!(*right, Expression::Literal(Value::Number(1.0)));
            }
            _ => panic!("Expected Binary expression"),
        }
    }

    #[test]
    fn test_group_of_one_collapses() {
        let expr = Expression::group(LogicalGroupOp::All, vec![can("edit_posts")]);
        assert_eq!(expr, can("edit_posts"));
    }

    #[test]
    fn test_display_group_parenthesizes_members() {
        let expr = Expression::group(
            LogicalGroupOp::Any,
            vec![
                can("edit_posts"),
                Expression::not(Expression::predicate(Predicate::UserLoggedIn)),
            ],
        );
        assert_eq!(
            expr.to_string(),
            "(current_user_can('edit_posts')) || (!is_user_logged_in())"
        );
    }

    #[test]
    fn test_display_nested_binary() {
        let expr = Expression::not(Expression::binary(
            can("a"),
            Operator::And,
            Expression::binary(can("b"), Operator::Or, can("c")),
        ));
        assert_eq!(
            expr.to_string(),
            "!(current_user_can('a') && (current_user_can('b') || current_user_can('c')))"
        );
    }

    #[test]
    fn test_function_call_display() {
        let expr = Expression::function_call(
            "has_term",
            vec![Expression::literal("news"), Expression::literal(3_i64)],
        );
        assert_eq!(expr.to_string(), "has_term('news', 3)");
        assert_eq!(expr.leaf_count(), 1);
    }

    #[test]
    fn test_depth_counts_longest_path() {
        assert_eq!(can("a").depth(), 1);
        let expr = Expression::not(Expression::binary(
            can("a"),
            Operator::And,
            Expression::binary(can("b"), Operator::Or, can("c")),
        ));
        assert_eq!(expr.depth(), 4);
        let call = Expression::function_call("has_term", vec![]);
        assert_eq!(call.depth(), 1);
    }
}
