//! Registry configuration loader.
//!
//! Reads a TOML file into [`RegistryConfig`]. Falls back to defaults when
//! the file is missing, malformed, or fails validation, so a bad config
//! never prevents the registry from starting.

use std::path::Path;

use buildstate_types::config::RegistryConfig;

/// Load registry configuration from `path`.
///
/// - If the file does not exist, returns [`RegistryConfig::default()`].
/// - If the file fails to parse or validate, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_registry_config(path: &Path) -> RegistryConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return RegistryConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return RegistryConfig::default();
        }
    };

    let config = match toml::from_str::<RegistryConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            return RegistryConfig::default();
        }
    };

    if let Err(err) = config.validate() {
        tracing::warn!("{}: {err}, using defaults", path.display());
        return RegistryConfig::default();
    }

    config
}
