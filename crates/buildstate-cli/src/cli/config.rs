//! `buildstate config` -- show the effective registry configuration.

use std::path::Path;

use anyhow::Result;
use console::style;

use buildstate_types::config::RegistryConfig;

/// Print `config` as TOML (default) or JSON.
pub fn show_config(config: &RegistryConfig, path: &Path, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!();
    println!(
        "  Effective config ({})",
        style(path.display()).cyan()
    );
    println!();
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
