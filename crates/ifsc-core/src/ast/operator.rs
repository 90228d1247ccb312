//! Operators for IFSC expressions

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    // Comparison operators
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,

    // Logical operators
    /// Logical AND (&&)
    And,
    /// Logical OR (||)
    Or,
}

impl Operator {
    /// Returns true if this is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Gt | Operator::Ge | Operator::Lt | Operator::Le
        )
    }

    /// Returns true if this is a logical operator
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    /// Source form of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::And => "&&",
            Operator::Or => "||",
        }
    }
}

impl FromStr for Operator {
    type Err = CoreError;

    /// Accepts the symbol forms plus `===`/`!==` (loose) and `and`/`or`
    fn from_str(op: &str) -> Result<Self, Self::Err> {
        match op.to_ascii_lowercase().as_str() {
            "==" | "===" => Ok(Operator::Eq),
            "!=" | "!==" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::Le),
            ">=" => Ok(Operator::Ge),
            "&&" | "and" => Ok(Operator::And),
            "||" | "or" => Ok(Operator::Or),
            _ => Err(CoreError::InvalidOperator(op.to_string())),
        }
    }
}
