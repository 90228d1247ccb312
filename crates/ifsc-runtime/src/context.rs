//! Evaluation context
//!
//! Everything the evaluator may consult is passed in explicitly: the current
//! visitor, whether the site is part of a network, the commerce adapter and
//! the function registry.

use crate::commerce::CommerceLookup;
use crate::functions::FunctionRegistry;
use ifsc_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The visitor a page is rendered for
pub trait Visitor {
    /// `0` for anonymous visitors
    fn user_id(&self) -> u64;

    fn is_logged_in(&self) -> bool {
        self.user_id() != 0
    }

    /// Role or capability check on the current site
    fn can(&self, capability: &str) -> bool;

    /// Role or capability check on another site of the network
    fn can_for_blog(&self, blog_id: i64, capability: &str) -> bool;

    /// Per-site user option, `Value::Null` when missing
    fn user_option(&self, user_id: u64, key: &str) -> Value;

    /// User meta value, `Value::Null` when missing
    fn user_meta(&self, user_id: u64, key: &str) -> Value;
}

/// Visitor backed by plain data, used by fixtures and tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryVisitor {
    pub user_id: u64,
    pub capabilities: HashSet<String>,
    pub blog_capabilities: HashMap<i64, HashSet<String>>,
    pub options: HashMap<String, Value>,
    pub meta: HashMap<String, Value>,
}

impl MemoryVisitor {
    /// An anonymous visitor
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn logged_in(user_id: u64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    pub fn with_blog_capability(mut self, blog_id: i64, capability: impl Into<String>) -> Self {
        self.blog_capabilities
            .entry(blog_id)
            .or_default()
            .insert(capability.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

impl Visitor for MemoryVisitor {
    fn user_id(&self) -> u64 {
        self.user_id
    }

    fn can(&self, capability: &str) -> bool {
        self.user_id != 0 && self.capabilities.contains(capability)
    }

    fn can_for_blog(&self, blog_id: i64, capability: &str) -> bool {
        self.user_id != 0
            && self
                .blog_capabilities
                .get(&blog_id)
                .is_some_and(|caps| caps.contains(capability))
    }

    fn user_option(&self, user_id: u64, key: &str) -> Value {
        if user_id == 0 || user_id != self.user_id {
            return Value::Null;
        }
        self.options.get(key).cloned().unwrap_or(Value::Null)
    }

    fn user_meta(&self, user_id: u64, key: &str) -> Value {
        if user_id == 0 || user_id != self.user_id {
            return Value::Null;
        }
        self.meta.get(key).cloned().unwrap_or(Value::Null)
    }
}

/// Context passed through one evaluation
pub struct EvalContext<'a> {
    visitor: &'a dyn Visitor,
    functions: &'a FunctionRegistry,
    commerce: Option<&'a CommerceLookup>,
    is_multisite: bool,
}

impl<'a> EvalContext<'a> {
    pub fn new(visitor: &'a dyn Visitor, functions: &'a FunctionRegistry) -> Self {
        Self {
            visitor,
            functions,
            commerce: None,
            is_multisite: false,
        }
    }

    /// Enable commerce predicates
    pub fn with_commerce(mut self, commerce: &'a CommerceLookup) -> Self {
        self.commerce = Some(commerce);
        self
    }

    pub fn with_multisite(mut self, is_multisite: bool) -> Self {
        self.is_multisite = is_multisite;
        self
    }

    pub fn visitor(&self) -> &dyn Visitor {
        self.visitor
    }

    pub fn functions(&self) -> &FunctionRegistry {
        self.functions
    }

    /// `None` when no commerce plugin is active
    pub fn commerce(&self) -> Option<&CommerceLookup> {
        self.commerce
    }

    pub fn is_commerce_active(&self) -> bool {
        self.commerce.is_some()
    }

    pub fn is_multisite(&self) -> bool {
        self.is_multisite
    }
}
