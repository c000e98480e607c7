//! Loading module configurations and policy catalogs from disk.
//!
//! The format is chosen by file extension: `.yaml`/`.yml` or `.json`.

use std::path::Path;

use serde::de::DeserializeOwned;
use vaultcraft_common::config::ModuleConfig;
use vaultcraft_common::error::{Result, VaultcraftError};
use vaultcraft_compose::lookup::StaticCatalog;

fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    tracing::info!(path = %path.display(), "loading file");

    let content = std::fs::read_to_string(path).map_err(|e| VaultcraftError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(VaultcraftError::Config {
            message: format!(
                "unsupported file type for {}: expected .yaml, .yml or .json",
                path.display()
            ),
        }),
    }
}

/// Loads a module configuration.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported
/// extension, or does not deserialize.
pub fn load_config(path: &Path) -> Result<ModuleConfig> {
    load(path)
}

/// Loads a policy definition catalog mapping display names to identifiers.
///
/// # Errors
///
/// Returns an error if the file cannot be read, has an unsupported
/// extension, or does not deserialize.
pub fn load_catalog(path: &Path) -> Result<StaticCatalog> {
    load(path)
}
