//! Settings file handling for azmon

use anyhow::{Context, Result};
use azmon_core::DatasourceSettings;
use std::path::{Path, PathBuf};

/// Load datasource settings from the default settings file.
///
/// A missing file is not an error: every backend is left unconfigured.
pub fn load() -> Result<DatasourceSettings> {
    let path = settings_path()?;
    if path.exists() {
        load_from(&path)
    } else {
        tracing::debug!(path = %path.display(), "No settings file, all backends unconfigured");
        Ok(DatasourceSettings::default())
    }
}

/// Load datasource settings from a specific path
pub fn load_from(path: &Path) -> Result<DatasourceSettings> {
    DatasourceSettings::load_from(path)
        .with_context(|| format!("Failed to load settings file: {}", path.display()))
}

/// Get the default settings file path
pub fn settings_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("azmon");

    Ok(config_dir.join("datasource.toml"))
}
