//! Unit tests for AST (Abstract Syntax Tree) types
//!
//! Tests the condition tree used by the compiler and the evaluator

use ifsc_core::ast::*;
use ifsc_core::types::Value;

// =============================================================================
// Expression Tests
// =============================================================================

#[test]
fn test_expression_literal_string() {
    let expr = Expression::literal("hello");
    match expr {
        Expression::Literal(Value::String(s)) => assert_eq!(s, "hello"),
        _ => panic!("Expected literal string"),
    }
}

#[test]
fn test_expression_literal_bool() {
    let expr = Expression::literal(true);
    match expr {
        Expression::Literal(Value::Bool(b)) => assert!(b),
        _ => panic!("Expected literal bool"),
    }
}

#[test]
fn test_expression_predicate_user_meta() {
    let expr = Expression::predicate(Predicate::UserMeta {
        user_id: 12,
        key: "nickname".to_string(),
    });
    assert_eq!(expr.to_string(), "get_user_meta(12, 'nickname')");
}

#[test]
fn test_expression_not_wraps_compound_operand() {
    let inner = Expression::binary(
        Expression::literal(1_i64),
        Operator::Lt,
        Expression::literal(2_i64),
    );
    assert_eq!(Expression::not(inner).to_string(), "!(1 < 2)");
}

#[test]
fn test_expression_group_all_renders_connective() {
    let expr = Expression::group(
        LogicalGroupOp::All,
        vec![
            Expression::predicate(Predicate::UserLoggedIn),
            Expression::predicate(Predicate::PayingCustomer { user_id: 4 }),
            Expression::function_call("is_front_page", vec![]),
        ],
    );
    assert_eq!(
        expr.to_string(),
        "(is_user_logged_in()) && (is_paying_customer(4)) && (is_front_page())"
    );
    assert_eq!(expr.leaf_count(), 3);
}

#[test]
fn test_expression_empty_group() {
    let expr = Expression::group(LogicalGroupOp::Any, vec![]);
    assert_eq!(expr.leaf_count(), 0);
    assert_eq!(expr.to_string(), "");
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_expression_serde_round_trip() {
    let expr = Expression::group(
        LogicalGroupOp::Any,
        vec![
            Expression::predicate(Predicate::UserCanForBlog {
                blog_id: 2,
                capability: "administrator".to_string(),
            }),
            Expression::not(Expression::predicate(Predicate::UserLoggedIn)),
        ],
    );

    let json = serde_json::to_string(&expr).unwrap();
    let back: Expression = serde_json::from_str(&json).unwrap();
    assert_eq!(expr, back);
}

#[test]
fn test_logical_group_op_connective() {
    assert_eq!(LogicalGroupOp::Any.connective(), "||");
    assert_eq!(LogicalGroupOp::All.connective(), "&&");
}
