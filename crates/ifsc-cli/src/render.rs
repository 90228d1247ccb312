//! Fixture loading and rendering for the `ifsc` binary

use crate::config::CliConfig;
use anyhow::{Context, Result};
use ifsc_sdk::{
    CommerceLookup, IfShortcode, MemoryCatalog, MemoryTransientStore, MemoryVisitor,
    ShortcodeProcessor,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

fn load_yaml<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} fixture '{}'", what, path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Invalid {} fixture '{}'", what, path.display()))
}

/// Load the visitor fixture, or an anonymous visitor when no path is set
pub fn load_visitor(path: Option<&Path>) -> Result<MemoryVisitor> {
    match path {
        Some(path) => load_yaml(path, "visitor"),
        None => {
            debug!("No visitor fixture, rendering for an anonymous visitor");
            Ok(MemoryVisitor::anonymous())
        }
    }
}

/// Load a product catalog fixture
pub fn load_catalog(path: &Path) -> Result<MemoryCatalog> {
    load_yaml(path, "catalog")
}

/// Build a processor for the site described by `config`
pub fn build_processor(config: &CliConfig) -> Result<ShortcodeProcessor> {
    let mut shortcode =
        IfShortcode::new(config.shortcode.clone()).with_multisite(config.multisite);

    if let Some(path) = &config.catalog {
        let catalog = load_catalog(path)?;
        let lookup = CommerceLookup::new(Arc::new(catalog), Arc::new(MemoryTransientStore::new()))
            .with_sku_limit(config.sku_limit);
        shortcode = shortcode.with_commerce(lookup);
        info!("Commerce enabled with catalog '{}'", path.display());
    }

    Ok(ShortcodeProcessor::new(shortcode))
}

/// Render `content` for the configured visitor
pub fn render(config: &CliConfig, content: &str) -> Result<String> {
    let visitor = load_visitor(config.visitor.as_deref())?;
    let processor = build_processor(config)?;
    Ok(processor.render(content, &visitor))
}
