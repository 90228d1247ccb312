//! IFSC Parser - text to AST for the `[if]` shortcode
//!
//! This crate turns shortcode text into structures the runtime can evaluate:
//! - [`TagScanner`] finds `[if]` tags and their bodies
//! - [`parse_attributes`] reads the attribute list of a tag
//! - [`SimpleExprCompiler`] compiles attribute values such as `a AND !b`
//! - [`ExpressionParser`] parses the restricted `php=""` expressions

pub mod attributes;
pub mod content;
pub mod error;
pub mod expression_parser;
pub mod html;
pub mod simple_expr;
pub mod tag;

// Re-export main parser types
pub use attributes::{parse_attributes, AttrKey, RawAttributes};
pub use content::{depth_of, split_else, tag_names, MAX_DEPTH};
pub use error::{ParseError, Result};
pub use expression_parser::ExpressionParser;
pub use html::{escape_html, html_trim, unescape_html};
pub use simple_expr::{Operand, SimpleExprCompiler};
pub use tag::{Segment, ShortcodeTag, TagScanner};

/// Deepest condition tree either expression parser will build
pub const MAX_NESTING: usize = 64;
