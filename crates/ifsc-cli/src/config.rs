//! Binary configuration

use ifsc_sdk::ShortcodeOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file looked up when no other path is given
pub const DEFAULT_CONFIG_PATH: &str = "config/ifsc";

/// Environment variable prefix, e.g. `IFSC_MULTISITE=true`
pub const ENV_PREFIX: &str = "IFSC";

/// Configuration for the `ifsc` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Shortcode options, as the host would store them
    pub shortcode: ShortcodeOptions,

    /// Whether the simulated site is a multisite network
    pub multisite: bool,

    /// SKU map cache limit
    pub sku_limit: usize,

    /// Visitor fixture (YAML). Anonymous visitor when unset
    pub visitor: Option<PathBuf>,

    /// Product catalog fixture (YAML). Commerce stays inactive when unset
    pub catalog: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            shortcode: ShortcodeOptions::default(),
            multisite: false,
            sku_limit: ifsc_sdk::DEFAULT_SKU_LIMIT,
            visitor: None,
            catalog: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from `.env`, `config/ifsc.*` and `IFSC_*` variables
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a config file path without extension
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build();

        match config_result {
            Ok(cfg) => cfg
                .try_deserialize()
                .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e)),
            Err(e) => {
                tracing::info!("No usable config at '{}' ({}), using defaults", path, e);
                Ok(Self::default())
            }
        }
    }
}
