//! Configuration loading for portctl.

use std::path::Path;

use anyhow::{Context, Result};
use winport::BinderConfig;

use crate::cli::Cli;

/// Builds the binder configuration from the optional config file and flags.
///
/// Flags win over the file. The merged result is validated.
pub fn load(cli: &Cli) -> Result<BinderConfig> {
    let mut config = match &cli.config {
        Some(path) => read(path)?,
        None => BinderConfig::default(),
    };
    if let Some(dir) = &cli.library_dir {
        config.library_dir = Some(dir.clone());
    }
    config.validate().context("Invalid binder configuration")?;
    Ok(config)
}

/// Reads and parses a TOML binder configuration file.
pub fn read(path: &Path) -> Result<BinderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse(content: &str) -> Result<BinderConfig> {
    Ok(toml::from_str(content)?)
}
