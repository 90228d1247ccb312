//! Attribute dispatch table
//!
//! Every normalized attribute is routed to one handler kind by name. Names
//! outside the built-in set are arbitrary attributes.

use ifsc_parser::RawAttributes;
use once_cell::sync::Lazy;
use regex::Regex;

pub const PHP: &str = "php";
pub const CURRENT_USER_IS_LOGGED_IN: &str = "current_user_is_logged_in";
pub const CURRENT_USER_CAN: &str = "current_user_can";
pub const CURRENT_USER_OPTION: &str = "current_user_option";
pub const CURRENT_USER_META: &str = "current_user_meta";
pub const CURRENT_USER_IS_PAYING_CUSTOMER: &str = "current_user_is_paying_customer";
pub const CURRENT_USER_BOUGHT_PRODUCT: &str = "current_user_bought_product";
pub const FOR_BLOG: &str = "_for_blog";
pub const SATISFY: &str = "_satisfy";
pub const DEBUG: &str = "_debug";

static ARBITRARY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*[a-z0-9]$").expect("valid attribute name pattern"));

/// How an attribute contributes to the condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// `php="..."`, parsed as a direct expression
    Php,
    /// `true|false`
    LoggedIn,
    /// Capability expression
    UserCan,
    /// Option key expression
    UserOption,
    /// Meta key expression
    UserMeta,
    /// `true|false`
    PayingCustomer,
    /// Product id or SKU expression
    BoughtProduct,
    /// `_for_blog`, `_satisfy`, `_debug`
    Modifier,
    /// Anything else
    Arbitrary,
}

impl AttributeKind {
    pub fn of(name: &str) -> Self {
        match name {
            PHP => AttributeKind::Php,
            CURRENT_USER_IS_LOGGED_IN => AttributeKind::LoggedIn,
            CURRENT_USER_CAN => AttributeKind::UserCan,
            CURRENT_USER_OPTION => AttributeKind::UserOption,
            CURRENT_USER_META => AttributeKind::UserMeta,
            CURRENT_USER_IS_PAYING_CUSTOMER => AttributeKind::PayingCustomer,
            CURRENT_USER_BOUGHT_PRODUCT => AttributeKind::BoughtProduct,
            FOR_BLOG | SATISFY | DEBUG => AttributeKind::Modifier,
            _ => AttributeKind::Arbitrary,
        }
    }

    pub fn is_builtin(self) -> bool {
        !matches!(self, AttributeKind::Arbitrary)
    }
}

/// Default attribute template, in dispatch order
pub fn default_attributes(debug_default: &str) -> RawAttributes {
    RawAttributes::from_pairs([
        (PHP, ""),
        (CURRENT_USER_IS_LOGGED_IN, ""),
        (CURRENT_USER_CAN, ""),
        (CURRENT_USER_OPTION, ""),
        (CURRENT_USER_META, ""),
        (CURRENT_USER_IS_PAYING_CUSTOMER, ""),
        (CURRENT_USER_BOUGHT_PRODUCT, ""),
        (FOR_BLOG, "0"),
        (SATISFY, "all"),
        (DEBUG, debug_default),
    ])
}

/// Values the host treats as false: `""` and `"0"`
pub fn is_falsy(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// Whether an arbitrary attribute name is acceptable
pub fn is_valid_arbitrary_name(name: &str, min_length: usize) -> bool {
    name.len() >= min_length && ARBITRARY_NAME.is_match(name)
}
