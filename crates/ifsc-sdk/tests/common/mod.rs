//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use ifsc_sdk::{
    CommerceLookup, FunctionRegistry, IfShortcode, MemoryCatalog, MemoryTransientStore,
    MemoryVisitor, ShortcodeOptions, ShortcodeProcessor,
};
use std::sync::Arc;

/// Test helper to build a processor for a simulated site
pub struct TestSite {
    options: ShortcodeOptions,
    catalog: Option<MemoryCatalog>,
    functions: Option<FunctionRegistry>,
    multisite: bool,
}

impl TestSite {
    pub fn new() -> Self {
        Self {
            options: ShortcodeOptions::default(),
            catalog: None,
            functions: None,
            multisite: false,
        }
    }

    /// Adjust the site options
    pub fn with_options(mut self, f: impl FnOnce(ShortcodeOptions) -> ShortcodeOptions) -> Self {
        self.options = f(self.options);
        self
    }

    /// Activate commerce with the given catalog
    pub fn with_catalog(mut self, catalog: MemoryCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = Some(functions);
        self
    }

    pub fn multisite(mut self) -> Self {
        self.multisite = true;
        self
    }

    pub fn shortcode(self) -> IfShortcode {
        let mut shortcode = IfShortcode::new(self.options).with_multisite(self.multisite);
        if let Some(functions) = self.functions {
            shortcode = shortcode.with_functions(functions);
        }
        if let Some(catalog) = self.catalog {
            let lookup = CommerceLookup::new(Arc::new(catalog), Arc::new(MemoryTransientStore::new()));
            shortcode = shortcode.with_commerce(lookup);
        }
        shortcode
    }

    pub fn processor(self) -> ShortcodeProcessor {
        ShortcodeProcessor::new(self.shortcode())
    }
}

/// Render content with a fresh default site
pub fn render(content: &str, visitor: &MemoryVisitor) -> String {
    TestSite::new().processor().render(content, visitor)
}

/// Load a visitor fixture
pub fn visitor_from_yaml(yaml: &str) -> MemoryVisitor {
    serde_yaml::from_str(yaml).expect("valid visitor fixture")
}
