//! Built-in predicates
//!
//! Each built-in `[if]` attribute compiles its tokens into one of these
//! predicates. User-dependent predicates carry the user id captured when the
//! invocation started, so evaluation never has to look the visitor up again.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, side-effect free lookup against the visitor or commerce state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Visitor is logged in
    UserLoggedIn,

    /// Visitor has a role or capability on the current site
    UserCan { capability: String },

    /// Visitor has a role or capability on another site of a network
    UserCanForBlog { blog_id: i64, capability: String },

    /// Per-site user option is truthy
    UserOption { user_id: u64, key: String },

    /// User meta value is truthy
    UserMeta { user_id: u64, key: String },

    /// Commerce flag marking a customer that completed a paid order
    PayingCustomer { user_id: u64 },

    /// Customer bought a product, given by numeric id or SKU
    BoughtProduct { user_id: u64, product: String },
}

impl Predicate {
    /// Name of the predicate as shown in rendered conditions
    pub fn name(&self) -> &'static str {
        match self {
            Predicate::UserLoggedIn => "is_user_logged_in",
            Predicate::UserCan { .. } => "current_user_can",
            Predicate::UserCanForBlog { .. } => "current_user_can_for_blog",
            Predicate::UserOption { .. } => "get_user_option",
            Predicate::UserMeta { .. } => "get_user_meta",
            Predicate::PayingCustomer { .. } => "is_paying_customer",
            Predicate::BoughtProduct { .. } => "customer_bought_product",
        }
    }

    /// Returns true if the predicate needs the commerce platform
    pub fn requires_commerce(&self) -> bool {
        matches!(
            self,
            Predicate::PayingCustomer { .. } | Predicate::BoughtProduct { .. }
        )
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::UserLoggedIn => write!(f, "{}()", self.name()),
            Predicate::UserCan { capability } => write!(f, "{}({})", self.name(), quote(capability)),
            Predicate::UserCanForBlog { blog_id, capability } => {
                write!(f, "{}({}, {})", self.name(), blog_id, quote(capability))
            }
            Predicate::UserOption { user_id, key } | Predicate::UserMeta { user_id, key } => {
                write!(f, "{}({}, {})", self.name(), user_id, quote(key))
            }
            Predicate::PayingCustomer { user_id } => write!(f, "{}({})", self.name(), user_id),
            Predicate::BoughtProduct { user_id, product } => {
                write!(f, "{}({}, {})", self.name(), user_id, quote(product))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_display() {
        assert_eq!(Predicate::UserLoggedIn.to_string(), "is_user_logged_in()");
        assert_eq!(
            Predicate::UserCanForBlog {
                blog_id: 3,
                capability: "edit_posts".to_string()
            }
            .to_string(),
            "current_user_can_for_blog(3, 'edit_posts')"
        );
        assert_eq!(
            Predicate::BoughtProduct {
                user_id: 7,
                product: "o'neil".to_string()
            }
            .to_string(),
            r"customer_bought_product(7, 'o\'neil')"
        );
    }

    #[test]
    fn test_requires_commerce() {
        assert!(Predicate::PayingCustomer { user_id: 1 }.requires_commerce());
        assert!(!Predicate::UserLoggedIn.requires_commerce());
    }
}
