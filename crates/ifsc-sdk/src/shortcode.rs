//! `[if]` shortcode handler

use crate::config::{OptionStore, OptionsCache, ResolvedOptions};
use crate::debug::{error_block, verbose_block};
use crate::error::ShortcodeError;
use crate::invocation::{DebugMode, HostFlags, ShortcodeInvocation};
use ifsc_parser::{tag_names, ShortcodeTag};
use ifsc_runtime::{CommerceLookup, EvalContext, Evaluator, FunctionRegistry, Visitor};
use tracing::{debug, warn};

/// Evaluates `[if]` tags
pub struct IfShortcode {
    options: OptionsCache,
    functions: FunctionRegistry,
    commerce: Option<CommerceLookup>,
    host: HostFlags,
}

impl IfShortcode {
    pub fn new(store: impl OptionStore + 'static) -> Self {
        Self {
            options: OptionsCache::new(store),
            functions: FunctionRegistry::with_builtins(),
            commerce: None,
            host: HostFlags::default(),
        }
    }

    /// Replace the function registry used by `php=""` and arbitrary attributes
    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    /// Activate commerce attributes
    pub fn with_commerce(mut self, commerce: CommerceLookup) -> Self {
        self.commerce = Some(commerce);
        self
    }

    pub fn with_multisite(mut self, is_multisite: bool) -> Self {
        self.host.is_multisite = is_multisite;
        self
    }

    pub fn options(&self) -> &ResolvedOptions {
        self.options.get()
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    pub fn commerce(&self) -> Option<&CommerceLookup> {
        self.commerce.as_ref()
    }

    /// Tag names handled, one per nesting depth
    pub fn tag_names(&self) -> Vec<String> {
        tag_names(&self.options().options.name)
    }

    /// Compile and evaluate one tag without rendering
    pub fn invoke(&self, tag: &ShortcodeTag, visitor: &dyn Visitor) -> (ShortcodeInvocation, bool) {
        let options = self.options();
        let mut invocation = ShortcodeInvocation::new(tag, options, visitor.user_id());
        invocation.compile(options, self.host);

        let condition = match invocation.condition() {
            Some(condition) if !invocation.has_errors() => condition,
            _ => return (invocation, false),
        };

        let mut ctx = EvalContext::new(visitor, &self.functions).with_multisite(self.host.is_multisite);
        if let Some(commerce) = &self.commerce {
            ctx = ctx.with_commerce(commerce);
        }

        let result = match Evaluator::evaluate(&condition, &ctx) {
            Ok(result) => result,
            Err(e) => {
                invocation.push_error(ShortcodeError::from(e));
                false
            }
        };
        debug!("[{}] {} => {}", invocation.tag, condition, result);
        (invocation, result)
    }

    /// Render one tag; `render_nested` expands shortcodes in the chosen branch
    pub fn on_shortcode(
        &self,
        tag: &ShortcodeTag,
        visitor: &dyn Visitor,
        render_nested: &dyn Fn(&str) -> String,
    ) -> String {
        let (invocation, result) = self.invoke(tag, visitor);
        let name = &self.options().options.name;

        let verbose = match invocation.debug {
            DebugMode::Verbose => verbose_block(name, &invocation),
            _ => String::new(),
        };

        if invocation.has_errors() {
            if invocation.debug.is_enabled() {
                return verbose + &error_block(name, &invocation);
            }
            for error in invocation.errors() {
                warn!("{}", error);
            }
            return String::new();
        }

        let branch = if result {
            &invocation.content_if
        } else {
            &invocation.content_else
        };
        verbose + &render_nested(branch)
    }
}
