//! Function registry
//!
//! Function calls in a condition (`php="is_user_logged_in()"` or an
//! arbitrary attribute such as `is_vip="true"`) never reach host code
//! directly. They are resolved by name in this registry, which starts with
//! a fixed set of visitor functions and can be extended by the host.

use crate::context::EvalContext;
use crate::error::{Result, RuntimeError};
use ifsc_core::Value;
use std::collections::HashMap;
use std::fmt;

/// A registered function
pub type NativeFunction = Box<dyn Fn(&[Value], &EvalContext<'_>) -> Result<Value> + Send + Sync>;

/// Named functions callable from conditions
pub struct FunctionRegistry {
    functions: HashMap<String, NativeFunction>,
}

impl FunctionRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// A registry with the visitor functions preinstalled
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();

        registry.register("is_user_logged_in", |args, ctx| {
            expect_args("is_user_logged_in", args, 0)?;
            Ok(Value::Bool(ctx.visitor().is_logged_in()))
        });
        registry.register("get_current_user_id", |args, ctx| {
            expect_args("get_current_user_id", args, 0)?;
            Ok(Value::Number(ctx.visitor().user_id() as f64))
        });
        registry.register("is_multisite", |args, ctx| {
            expect_args("is_multisite", args, 0)?;
            Ok(Value::Bool(ctx.is_multisite()))
        });
        registry.register("current_user_can", |args, ctx| {
            expect_args("current_user_can", args, 1)?;
            let capability = string_arg("current_user_can", &args[0])?;
            Ok(Value::Bool(ctx.visitor().can(&capability)))
        });
        registry.register("current_user_can_for_blog", |args, ctx| {
            expect_args("current_user_can_for_blog", args, 2)?;
            let blog_id = int_arg("current_user_can_for_blog", &args[0])?;
            let capability = string_arg("current_user_can_for_blog", &args[1])?;
            Ok(Value::Bool(ctx.visitor().can_for_blog(blog_id, &capability)))
        });
        registry.register("get_user_option", |args, ctx| {
            expect_args("get_user_option", args, 1)?;
            let key = string_arg("get_user_option", &args[0])?;
            let visitor = ctx.visitor();
            Ok(visitor.user_option(visitor.user_id(), &key))
        });
        registry.register("get_user_meta", |args, ctx| {
            expect_args("get_user_meta", args, 2)?;
            let user_id = int_arg("get_user_meta", &args[0])?;
            let key = string_arg("get_user_meta", &args[1])?;
            Ok(ctx.visitor().user_meta(user_id.max(0) as u64, &key))
        });

        registry
    }

    /// Register or replace a function
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value], &EvalContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Call `name` with already evaluated arguments
    pub fn call(&self, name: &str, args: &[Value], ctx: &EvalContext<'_>) -> Result<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_string()))?;
        function(args, ctx)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionRegistry").field("functions", &names).finish()
    }
}

fn expect_args(function: &str, args: &[Value], count: usize) -> Result<()> {
    if args.len() == count {
        return Ok(());
    }
    let expected = match count {
        0 => "no arguments".to_string(),
        1 => "1 argument".to_string(),
        n => format!("{} arguments", n),
    };
    Err(RuntimeError::arguments(function, &expected))
}

fn string_arg(function: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(_) | Value::Bool(_) => Ok(value.to_string()),
        _ => Err(RuntimeError::arguments(function, "a string argument")),
    }
}

fn int_arg(function: &str, value: &Value) -> Result<i64> {
    value
        .as_number()
        .filter(|n| n.fract() == 0.0)
        .map(|n| n as i64)
        .ok_or_else(|| RuntimeError::arguments(function, "an integer argument"))
}
