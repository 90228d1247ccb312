//! IFSC command line library
//!
//! Renders `[if]` content against visitor and catalog fixtures. Exposed as a
//! library so the binary's loading logic can be tested.

pub mod config;
pub mod render;

pub use config::CliConfig;
pub use render::{build_processor, load_catalog, load_visitor, render};
