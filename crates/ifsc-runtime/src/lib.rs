//! IFSC Runtime - condition evaluation for the `[if]` shortcode
//!
//! This crate evaluates compiled condition trees against an explicit
//! context: the current visitor, a function registry and, when a commerce
//! plugin is active, the commerce lookup adapter.

pub mod commerce;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod functions;

// Re-export main types
pub use commerce::{
    CommerceLookup, LookupMemo, MemoryCatalog, MemoryTransientStore, ProductCatalog,
    TransientStore, DEFAULT_SKU_LIMIT,
};
pub use context::{EvalContext, MemoryVisitor, Visitor};
pub use error::{Result, RuntimeError};
pub use evaluator::Evaluator;
pub use functions::{FunctionRegistry, NativeFunction};
