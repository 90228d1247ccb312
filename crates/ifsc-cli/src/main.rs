//! IFSC command line renderer
//!
//! Renders a content file containing `[if]` shortcodes as a given visitor
//! would see it.

use anyhow::{Context, Result};
use clap::Parser;
use ifsc_cli::CliConfig;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ifsc")]
#[command(about = "Render [if] shortcode content for a visitor", long_about = None)]
struct Cli {
    /// Content file to render, `-` for stdin
    content: PathBuf,

    /// Visitor fixture (YAML)
    #[arg(short, long)]
    visitor: Option<PathBuf>,

    /// Product catalog fixture (YAML)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Config file path without extension
    #[arg(long, default_value = ifsc_cli::config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Simulate a multisite network
    #[arg(short, long)]
    multisite: bool,
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();

    let mut config = CliConfig::load_from(&cli.config)?;
    if cli.visitor.is_some() {
        config.visitor = cli.visitor;
    }
    if cli.catalog.is_some() {
        config.catalog = cli.catalog;
    }
    config.multisite |= cli.multisite;
    info!("Loaded configuration: {:?}", config);

    let content = read_content(&cli.content)?;
    let output = ifsc_cli::render(&config, &content)?;
    print!("{}", output);

    Ok(())
}

fn read_content(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read content from stdin")?;
        return Ok(content);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read content '{}'", path.display()))
}

/// Initialize tracing subscriber
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ifsc_cli=info,ifsc_sdk=info,ifsc_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
