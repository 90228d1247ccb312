//! Condition evaluator
//!
//! Walks a compiled condition tree and reduces it to a boolean. The tree is
//! closed: literals, predicates, registered functions and operators are all
//! there is, so evaluation cannot reach anything the context does not expose.

use crate::context::EvalContext;
use crate::error::{Result, RuntimeError};
use ifsc_core::ast::{Expression, LogicalGroupOp, Operator, Predicate, UnaryOperator};
use ifsc_core::Value;
use std::cmp::Ordering;

/// Paying customers carry this user meta flag
const PAYING_CUSTOMER_META: &str = "paying_customer";

pub struct Evaluator;

impl Evaluator {
    /// Evaluate `expr` to a boolean
    pub fn evaluate(expr: &Expression, ctx: &EvalContext<'_>) -> Result<bool> {
        let value = Self::evaluate_value(expr, ctx)?;
        tracing::trace!("evaluated '{}' => {}", expr, value);
        Ok(value.is_truthy())
    }

    /// Evaluate `expr` to a value
    pub fn evaluate_value(expr: &Expression, ctx: &EvalContext<'_>) -> Result<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Predicate(predicate) => {
                Self::evaluate_predicate(predicate, ctx).map(Value::Bool)
            }

            Expression::FunctionCall { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| Self::evaluate_value(arg, ctx))
                    .collect::<Result<Vec<_>>>()?;
                ctx.functions().call(name, &args, ctx)
            }

            Expression::Binary { left, op, right } => match op {
                Operator::And => Ok(Value::Bool(
                    Self::evaluate(left, ctx)? && Self::evaluate(right, ctx)?,
                )),
                Operator::Or => Ok(Value::Bool(
                    Self::evaluate(left, ctx)? || Self::evaluate(right, ctx)?,
                )),
                _ => {
                    let left = Self::evaluate_value(left, ctx)?;
                    let right = Self::evaluate_value(right, ctx)?;
                    compare(&left, op, &right).map(Value::Bool)
                }
            },

            Expression::Unary { op, operand } => match op {
                UnaryOperator::Not => Ok(Value::Bool(!Self::evaluate(operand, ctx)?)),
                UnaryOperator::Negate => match Self::evaluate_value(operand, ctx)? {
                    Value::Number(n) => Ok(Value::Number(-n)),
                    other => Err(RuntimeError::TypeError(format!(
                        "Cannot negate {}",
                        other.type_name()
                    ))),
                },
            },

            // An empty group never holds
            Expression::LogicalGroup { conditions, .. } if conditions.is_empty() => {
                Ok(Value::Bool(false))
            }
            Expression::LogicalGroup { op, conditions } => {
                for condition in conditions {
                    let result = Self::evaluate(condition, ctx)?;
                    match (op, result) {
                        (LogicalGroupOp::All, false) => return Ok(Value::Bool(false)),
                        (LogicalGroupOp::Any, true) => return Ok(Value::Bool(true)),
                        _ => {}
                    }
                }
                Ok(Value::Bool(*op == LogicalGroupOp::All))
            }
        }
    }

    /// Evaluate a visitor predicate
    fn evaluate_predicate(predicate: &Predicate, ctx: &EvalContext<'_>) -> Result<bool> {
        let visitor = ctx.visitor();

        let result = match predicate {
            Predicate::UserLoggedIn => visitor.is_logged_in(),
            Predicate::UserCan { capability } => visitor.can(capability),
            Predicate::UserCanForBlog { blog_id, capability } => {
                visitor.can_for_blog(*blog_id, capability)
            }
            Predicate::UserOption { user_id: 0, .. } | Predicate::UserMeta { user_id: 0, .. } => {
                false
            }
            Predicate::UserOption { user_id, key } => visitor.user_option(*user_id, key).is_truthy(),
            Predicate::UserMeta { user_id, key } => visitor.user_meta(*user_id, key).is_truthy(),
            Predicate::PayingCustomer { user_id } => {
                ctx.is_commerce_active()
                    && *user_id != 0
                    && visitor.user_meta(*user_id, PAYING_CUSTOMER_META).is_truthy()
            }
            Predicate::BoughtProduct { user_id, product } => match ctx.commerce() {
                Some(commerce) if *user_id != 0 => {
                    commerce.customer_bought_product(*user_id, product)?
                }
                _ => false,
            },
        };

        tracing::debug!("predicate {} => {}", predicate, result);
        Ok(result)
    }
}

/// Loose comparison of two values
///
/// - numbers and numeric strings compare numerically
/// - other strings compare byte-wise
/// - a bool or null on either side compares truthiness
/// - arrays only support `==` and `!=`
fn compare(left: &Value, op: &Operator, right: &Value) -> Result<bool> {
    let ordering = match (left, right) {
        (Value::Bool(_) | Value::Null, _) | (_, Value::Bool(_) | Value::Null) => {
            Some(left.is_truthy().cmp(&right.is_truthy()))
        }
        (Value::Array(_), _) | (_, Value::Array(_)) => {
            return match op {
                Operator::Eq => Ok(left == right),
                Operator::Ne => Ok(left != right),
                _ => Err(RuntimeError::InvalidOperation(format!(
                    "Cannot compare {} and {} with {}",
                    left.type_name(),
                    right.type_name(),
                    op.symbol()
                ))),
            };
        }
        (Value::String(l), Value::String(r)) => match (numeric(l), numeric(r)) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => Some(l.as_str().cmp(r.as_str())),
        },
        _ => match (left.as_number(), right.as_number()) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ => Some(display_text(left).cmp(&display_text(right))),
        },
    };

    // NaN never compares equal
    let Some(ordering) = ordering else {
        return Ok(*op == Operator::Ne);
    };

    match op {
        Operator::Eq => Ok(ordering == Ordering::Equal),
        Operator::Ne => Ok(ordering != Ordering::Equal),
        Operator::Gt => Ok(ordering == Ordering::Greater),
        Operator::Ge => Ok(ordering != Ordering::Less),
        Operator::Lt => Ok(ordering == Ordering::Less),
        Operator::Le => Ok(ordering != Ordering::Greater),
        Operator::And | Operator::Or => Err(RuntimeError::InvalidOperation(format!(
            "{} is not a comparison",
            op.symbol()
        ))),
    }
}

fn numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MemoryVisitor;
    use crate::functions::FunctionRegistry;

    fn lit(v: impl Into<Value>) -> Expression {
        Expression::literal(v)
    }

    fn eval(expr: &Expression, visitor: &MemoryVisitor) -> Result<bool> {
        let registry = FunctionRegistry::with_builtins();
        let ctx = EvalContext::new(visitor, &registry);
        Evaluator::evaluate(expr, &ctx)
    }

    #[test]
    fn test_loose_comparisons() {
        let cases = [
            (lit(1_i64), Operator::Eq, lit(1_i64), true),
            (lit("10"), Operator::Gt, lit("9"), true),
            (lit("abc"), Operator::Lt, lit("abd"), true),
            (lit(1_i64), Operator::Eq, lit("1.0"), true),
            (lit(true), Operator::Eq, lit("yes"), true),
            (Expression::Literal(Value::Null), Operator::Eq, lit(false), true),
            (lit("a"), Operator::Ne, lit("b"), true),
            (lit(2_i64), Operator::Le, lit(1_i64), false),
        ];
        let visitor = MemoryVisitor::anonymous();
        for (left, op, right, expected) in cases {
            let expr = Expression::binary(left, op, right);
            assert_eq!(eval(&expr, &visitor).unwrap(), expected, "{}", expr);
        }
    }

    #[test]
    fn test_array_ordering_is_an_error() {
        let expr = Expression::binary(
            Expression::Literal(Value::Array(vec![])),
            Operator::Lt,
            lit(1_i64),
        );
        assert!(matches!(
            eval(&expr, &MemoryVisitor::anonymous()),
            Err(RuntimeError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_groups() {
        let visitor = MemoryVisitor::logged_in(1).with_capability("edit_posts");
        let can = |cap: &str| {
            Expression::predicate(Predicate::UserCan {
                capability: cap.to_string(),
            })
        };

        let all = Expression::group(LogicalGroupOp::All, vec![can("edit_posts"), can("manage_options")]);
        let any = Expression::group(LogicalGroupOp::Any, vec![can("edit_posts"), can("manage_options")]);
        assert!(!eval(&all, &visitor).unwrap());
        assert!(eval(&any, &visitor).unwrap());
        assert!(!eval(&Expression::group(LogicalGroupOp::All, vec![]), &visitor).unwrap());
    }

    #[test]
    fn test_user_predicates_are_false_for_user_zero() {
        let visitor = MemoryVisitor::anonymous().with_meta("x", "1");
        let expr = Expression::predicate(Predicate::UserMeta {
            user_id: 0,
            key: "x".to_string(),
        });
        assert!(!eval(&expr, &visitor).unwrap());
    }

    #[test]
    fn test_commerce_predicates_need_commerce() {
        let visitor = MemoryVisitor::logged_in(4).with_meta("paying_customer", "1");
        let expr = Expression::predicate(Predicate::PayingCustomer { user_id: 4 });
        assert!(!eval(&expr, &visitor).unwrap());
    }

    #[test]
    fn test_unknown_function_fails() {
        let expr = Expression::function_call("shell_exec", vec![lit("ls")]);
        assert_eq!(
            eval(&expr, &MemoryVisitor::anonymous()).unwrap_err().to_string(),
            "Call to undefined function shell_exec()"
        );
    }

    #[test]
    fn test_short_circuit_skips_failing_branch() {
        let expr = Expression::binary(
            lit(false),
            Operator::And,
            Expression::function_call("undefined", vec![]),
        );
        assert!(!eval(&expr, &MemoryVisitor::anonymous()).unwrap());
    }
}
