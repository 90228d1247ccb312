//! IFSC SDK - the `[if]` conditional content shortcode
//!
//! ```text
//! [if current_user_can="edit_posts"]Editors see this[else]Everyone else sees this[/if]
//! ```
//!
//! [`ShortcodeProcessor`] renders content, [`IfShortcode`] compiles and
//! evaluates a single tag, and [`ShortcodeOptions`] holds the host options.

pub mod attributes;
pub mod config;
pub mod debug;
pub mod error;
pub mod invocation;
pub mod processor;
pub mod shortcode;

// Re-export main types
pub use attributes::AttributeKind;
pub use config::{OptionStore, OptionsCache, ResolvedOptions, ShortcodeOptions};
pub use error::{Result, ShortcodeError};
pub use invocation::{DebugMode, HostFlags, SatisfyMode, ShortcodeInvocation};
pub use processor::ShortcodeProcessor;
pub use shortcode::IfShortcode;

// Re-export runtime collaborators hosts implement or configure
pub use ifsc_runtime::{
    CommerceLookup, FunctionRegistry, MemoryCatalog, MemoryTransientStore, MemoryVisitor,
    ProductCatalog, TransientStore, Visitor, DEFAULT_SKU_LIMIT,
};
