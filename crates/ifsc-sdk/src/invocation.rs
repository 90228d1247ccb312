//! One `[if]` invocation: normalized attributes, compiled condition and
//! collected errors.

use crate::attributes::{
    default_attributes, is_falsy, is_valid_arbitrary_name, AttributeKind, DEBUG, FOR_BLOG, PHP,
    SATISFY,
};
use crate::config::ResolvedOptions;
use crate::error::ShortcodeError;
use ifsc_core::ast::{Expression, LogicalGroupOp, Predicate};
use ifsc_parser::{
    depth_of, split_else, unescape_html, AttrKey, ExpressionParser, Operand, ParseError,
    RawAttributes, ShortcodeTag, SimpleExprCompiler,
};
use indexmap::IndexMap;
use serde_json::json;

/// How multiple conditions combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatisfyMode {
    All,
    Any,
}

impl SatisfyMode {
    /// `any` selects [`SatisfyMode::Any`]; everything else is `all`
    pub fn parse(value: &str) -> Self {
        if value == "any" {
            SatisfyMode::Any
        } else {
            SatisfyMode::All
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SatisfyMode::All => "all",
            SatisfyMode::Any => "any",
        }
    }

    pub fn group_op(self) -> LogicalGroupOp {
        match self {
            SatisfyMode::All => LogicalGroupOp::All,
            SatisfyMode::Any => LogicalGroupOp::Any,
        }
    }
}

/// `_debug` modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugMode {
    Off,
    On,
    Verbose,
}

impl DebugMode {
    /// `verbose` is kept; other non-falsy values are read as a boolean flag
    pub fn parse(value: &str) -> Self {
        if value == "verbose" {
            return DebugMode::Verbose;
        }
        if is_falsy(value) {
            return DebugMode::Off;
        }
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "on" | "yes" | "true" => DebugMode::On,
            _ => DebugMode::Off,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != DebugMode::Off
    }
}

/// Integer prefix of a string; `0` when there is none
pub fn lenient_int(value: &str) -> i64 {
    let s = value.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        n = n.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative {
        -n
    } else {
        n
    }
}

/// Host environment facts the compile phase depends on
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFlags {
    pub is_multisite: bool,
}

/// State of one shortcode call
#[derive(Debug, Clone)]
pub struct ShortcodeInvocation {
    /// Tag name as used, with leading underscores
    pub tag: String,
    pub depth: usize,
    pub user_id: u64,
    pub raw_attributes: RawAttributes,
    /// Defaults merged with unescaped, trimmed author values
    pub attributes: RawAttributes,
    pub for_blog: i64,
    pub satisfy: SatisfyMode,
    pub debug: DebugMode,
    pub content_if: String,
    pub content_else: String,
    conditions: Vec<Expression>,
    errors: Vec<ShortcodeError>,
}

impl ShortcodeInvocation {
    /// Normalize a scanned tag for the given user
    pub fn new(tag: &ShortcodeTag, options: &ResolvedOptions, user_id: u64) -> Self {
        let mut attributes = default_attributes(&options.options.debug_att_default);
        for (key, value) in tag.attributes.iter() {
            attributes.insert(key.clone(), unescape_html(value).trim());
        }

        let for_blog = lenient_int(attributes.get(FOR_BLOG).unwrap_or_default());
        let satisfy = SatisfyMode::parse(attributes.get(SATISFY).unwrap_or_default());
        let debug = DebugMode::parse(attributes.get(DEBUG).unwrap_or_default());

        attributes.insert(AttrKey::named(FOR_BLOG), for_blog.to_string());
        attributes.insert(AttrKey::named(SATISFY), satisfy.as_str());

        let depth = depth_of(&tag.name);
        let (content_if, content_else) =
            split_else(tag.content_or_empty(), &options.options.else_name, depth);

        Self {
            tag: tag.name.clone(),
            depth,
            user_id,
            raw_attributes: tag.attributes.clone(),
            attributes,
            for_blog,
            satisfy,
            debug,
            content_if,
            content_else,
            conditions: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[ShortcodeError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn push_error(&mut self, error: ShortcodeError) {
        self.errors.push(error);
    }

    /// Combined condition, `None` when no attribute produced one
    pub fn condition(&self) -> Option<Expression> {
        if self.conditions.is_empty() {
            return None;
        }
        Some(Expression::group(self.satisfy.group_op(), self.conditions.clone()))
    }

    /// Text form of the condition, empty when there is none.
    ///
    /// Every appended condition is parenthesized, a single one included.
    pub fn condition_text(&self) -> String {
        let connective = format!(" {} ", self.satisfy.group_op().connective());
        self.conditions
            .iter()
            .map(|condition| format!("({})", condition))
            .collect::<Vec<_>>()
            .join(&connective)
    }

    /// Rebuild the tag as written
    pub fn recreate(&self) -> String {
        self.raw_attributes.recreate(&self.tag)
    }

    /// Normalized attributes as pretty JSON, modifiers typed
    pub fn attributes_json(&self) -> String {
        let map: IndexMap<String, serde_json::Value> = self
            .attributes
            .iter()
            .map(|(key, value)| {
                let value = match key.as_name() {
                    Some(FOR_BLOG) => json!(self.for_blog),
                    Some(DEBUG) if self.debug == DebugMode::Verbose => json!("verbose"),
                    Some(DEBUG) => json!(self.debug.is_enabled()),
                    _ => json!(value),
                };
                (key.to_string(), value)
            })
            .collect();
        serde_json::to_string_pretty(&map).unwrap_or_default()
    }

    /// Compile every attribute into the condition list
    pub fn compile(&mut self, options: &ResolvedOptions, host: HostFlags) {
        let opts = &options.options;

        let php = self.attributes.get(PHP).unwrap_or_default().to_string();
        if !is_falsy(&php) && !opts.enable_php_att {
            self.push_error(ShortcodeError::FeatureDisabled {
                tag: self.tag.clone(),
                attribute: PHP.to_string(),
                value: php,
                arbitrary: false,
            });
        }
        if self.for_blog != 0 && !opts.enable_for_blog_att {
            self.push_error(ShortcodeError::FeatureDisabled {
                tag: self.tag.clone(),
                attribute: FOR_BLOG.to_string(),
                value: self.for_blog.to_string(),
                arbitrary: false,
            });
        }

        let entries: Vec<(AttrKey, String)> = self
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();

        for (key, value) in entries {
            let name = match key {
                AttrKey::Positional(_) => {
                    self.push_error(ShortcodeError::UnsupportedBareAttribute {
                        tag: self.tag.clone(),
                        value,
                    });
                    continue;
                }
                AttrKey::Named(name) => name,
            };
            if is_falsy(&value) {
                continue;
            }

            match AttributeKind::of(&name) {
                AttributeKind::Php => {
                    if opts.enable_php_att {
                        match ExpressionParser::parse(&value) {
                            Ok(expr) => self.conditions.push(expr),
                            Err(e) => self.invalid_expression(&name, &value, e),
                        }
                    }
                }
                AttributeKind::LoggedIn => {
                    self.append_flag(&value, Expression::predicate(Predicate::UserLoggedIn));
                }
                AttributeKind::PayingCustomer => {
                    let user_id = self.user_id;
                    self.append_flag(
                        &value,
                        Expression::predicate(Predicate::PayingCustomer { user_id }),
                    );
                }
                AttributeKind::UserCan => {
                    let blog_id = self.for_blog;
                    let cross_site = blog_id != 0 && opts.enable_for_blog_att && host.is_multisite;
                    self.append_simple(&name, &value, |capability| {
                        let capability = capability.to_string();
                        let predicate = if cross_site {
                            Predicate::UserCanForBlog { blog_id, capability }
                        } else {
                            Predicate::UserCan { capability }
                        };
                        Expression::predicate(predicate)
                    });
                }
                AttributeKind::UserOption => {
                    let user_id = self.user_id;
                    self.append_simple(&name, &value, |key| {
                        Expression::predicate(Predicate::UserOption {
                            user_id,
                            key: key.to_string(),
                        })
                    });
                }
                AttributeKind::UserMeta => {
                    let user_id = self.user_id;
                    self.append_simple(&name, &value, |key| {
                        Expression::predicate(Predicate::UserMeta {
                            user_id,
                            key: key.to_string(),
                        })
                    });
                }
                AttributeKind::BoughtProduct => {
                    let user_id = self.user_id;
                    self.append_simple(&name, &value, |product| {
                        Expression::predicate(Predicate::BoughtProduct {
                            user_id,
                            product: product.to_string(),
                        })
                    });
                }
                AttributeKind::Modifier => {}
                AttributeKind::Arbitrary if name.starts_with('_') => {}
                AttributeKind::Arbitrary => self.compile_arbitrary(options, name, value),
            }
        }

        tracing::debug!(
            "[{}] compiled {} condition(s), {} error(s)",
            self.tag,
            self.conditions.len(),
            self.errors.len()
        );
    }

    fn compile_arbitrary(&mut self, options: &ResolvedOptions, name: String, value: String) {
        let opts = &options.options;

        if !opts.enable_arbitrary_atts {
            self.push_error(ShortcodeError::FeatureDisabled {
                tag: self.tag.clone(),
                attribute: name,
                value,
                arbitrary: true,
            });
        } else if !options.is_whitelisted(&name) {
            self.push_error(ShortcodeError::NotWhitelisted {
                tag: self.tag.clone(),
                attribute: name,
                value,
            });
        } else if !is_valid_arbitrary_name(&name, opts.arbitrary_att_min_length) {
            self.push_error(ShortcodeError::InvalidAttributeName {
                tag: self.tag.clone(),
                attribute: name,
                value,
                min_length: opts.arbitrary_att_min_length,
            });
        } else if value == "true" || value == "false" {
            let call = Expression::function_call(name.as_str(), vec![]);
            self.append_flag(&value, call);
        } else {
            // Every comma item becomes one string argument
            let result = SimpleExprCompiler::compile(&value, |operand: &Operand| {
                let args = operand
                    .items()
                    .iter()
                    .map(|item| Expression::literal(item.as_str()))
                    .collect();
                Ok(Expression::function_call(name.as_str(), args))
            });
            match result {
                Ok(expr) => self.conditions.push(expr),
                Err(e) => self.invalid_expression(&name, &value, e),
            }
        }
    }

    // `false` negates, any other value means true
    fn append_flag(&mut self, value: &str, expr: Expression) {
        let expr = if value == "false" {
            Expression::not(expr)
        } else {
            expr
        };
        self.conditions.push(expr);
    }

    fn append_simple<F>(&mut self, name: &str, value: &str, mut build: F)
    where
        F: FnMut(&str) -> Expression,
    {
        let result = SimpleExprCompiler::compile(value, |operand: &Operand| {
            operand.expand(LogicalGroupOp::All, |item| Ok(build(item)))
        });
        match result {
            Ok(expr) => self.conditions.push(expr),
            Err(e) => self.invalid_expression(name, value, e),
        }
    }

    fn invalid_expression(&mut self, name: &str, value: &str, err: ParseError) {
        self.push_error(ShortcodeError::InvalidExpression {
            tag: self.tag.clone(),
            attribute: name.to_string(),
            value: value.to_string(),
            reason: err.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShortcodeOptions;
    use ifsc_parser::parse_attributes;

    fn invocation(atts: &str, options: ShortcodeOptions) -> ShortcodeInvocation {
        let tag = ShortcodeTag {
            name: "if".to_string(),
            attributes: parse_attributes(atts),
            content: Some("yes[else]no".to_string()),
        };
        let resolved = ResolvedOptions::new(options);
        let mut inv = ShortcodeInvocation::new(&tag, &resolved, 9);
        inv.compile(&resolved, HostFlags::default());
        inv
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int("12"), 12);
        assert_eq!(lenient_int(" -3abc"), -3);
        assert_eq!(lenient_int("abc"), 0);
        assert_eq!(lenient_int(""), 0);
    }

    #[test]
    fn test_debug_mode_parse() {
        assert_eq!(DebugMode::parse("verbose"), DebugMode::Verbose);
        assert_eq!(DebugMode::parse("yes"), DebugMode::On);
        assert_eq!(DebugMode::parse("TRUE"), DebugMode::On);
        assert_eq!(DebugMode::parse("false"), DebugMode::Off);
        assert_eq!(DebugMode::parse("0"), DebugMode::Off);
        assert_eq!(DebugMode::parse("maybe"), DebugMode::Off);
    }

    #[test]
    fn test_normalization_merges_over_defaults() {
        let inv = invocation(
            r#"is_vip="true" current_user_can=" edit_posts " _satisfy="ANY""#,
            ShortcodeOptions::default(),
        );
        let names: Vec<_> = inv.attributes.keys().map(|k| k.to_string()).collect();
        assert_eq!(names[2], "current_user_can");
        assert_eq!(names.last().map(String::as_str), Some("is_vip"));
        assert_eq!(inv.attributes.get("current_user_can"), Some("edit_posts"));
        assert_eq!(inv.satisfy, SatisfyMode::All);
        assert_eq!((inv.content_if.as_str(), inv.content_else.as_str()), ("yes", "no"));
    }

    #[test]
    fn test_conditions_join_with_satisfy_mode() {
        let inv = invocation(
            r#"current_user_is_logged_in="true" current_user_can="edit_posts" _satisfy="any""#,
            ShortcodeOptions::default(),
        );
        assert!(!inv.has_errors());
        assert_eq!(
            inv.condition_text(),
            "(is_user_logged_in()) || (current_user_can('edit_posts'))"
        );
    }

    #[test]
    fn test_falsy_values_are_skipped() {
        let inv = invocation(r#"current_user_can="0" current_user_meta="""#, ShortcodeOptions::default());
        assert!(inv.condition().is_none());
        assert!(!inv.has_errors());
    }

    #[test]
    fn test_arbitrary_expression_arguments() {
        let options = ShortcodeOptions::new().enable_arbitrary_atts(true);
        let inv = invocation(r#"has_term="news,tech AND !sport""#, options);
        assert_eq!(
            inv.condition_text(),
            "(has_term('news', 'tech') && !has_term('sport'))"
        );
    }

    #[test]
    fn test_bare_attributes_each_report_an_error() {
        let inv = invocation("current_user_is_logged_in debug", ShortcodeOptions::default());
        assert_eq!(inv.errors().len(), 2);
        assert!(matches!(
            inv.errors()[0],
            ShortcodeError::UnsupportedBareAttribute { .. }
        ));
    }

    #[test]
    fn test_invalid_expression_is_collected() {
        let inv = invocation(r#"current_user_can="edit_posts AND""#, ShortcodeOptions::default());
        assert!(matches!(
            &inv.errors()[0],
            ShortcodeError::InvalidExpression { attribute, .. } if attribute == "current_user_can"
        ));
        assert!(inv.condition().is_none());
    }

    #[test]
    fn test_attributes_json_types_modifiers() {
        let inv = invocation(r#"_for_blog="3" _debug="verbose""#, ShortcodeOptions::default());
        let json: serde_json::Value = serde_json::from_str(&inv.attributes_json()).unwrap();
        assert_eq!(json["_for_blog"], json!(3));
        assert_eq!(json["_debug"], json!("verbose"));
        assert_eq!(json["_satisfy"], json!("all"));
    }
}
