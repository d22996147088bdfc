//! Configuration management for servicefinder.
//!
//! Global config: `~/.config/servicefinder/config.ccl`. Command-line flags
//! override anything set there.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the catalogue file looked up in the config directory.
pub const DEFAULT_CATALOGUE_FILE: &str = "catalogues.ccl";

/// Global servicefinder configuration.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
pub struct FinderConfig {
    /// Catalogue file to load. Default: `<config dir>/catalogues.ccl`
    #[serde(default)]
    pub catalogue_file: Option<PathBuf>,
    /// Where listings are stored.
    /// Default: `~/.local/share/servicefinder/`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Signed-in provider.
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl FinderConfig {
    /// Apply command-line overrides on top of the file values.
    #[must_use]
    pub fn with_overrides(
        mut self,
        catalogue_file: Option<PathBuf>,
        data_dir: Option<PathBuf>,
        provider_id: Option<String>,
    ) -> Self {
        if catalogue_file.is_some() {
            self.catalogue_file = catalogue_file;
        }
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        if provider_id.is_some() {
            self.provider_id = provider_id;
        }
        self
    }

    /// Catalogue file, falling back to the one in the config directory.
    pub fn catalogue_path(&self) -> Result<PathBuf> {
        match &self.catalogue_file {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(DEFAULT_CATALOGUE_FILE)),
        }
    }

    /// Listing data directory, falling back to the platform data directory.
    pub fn data_path(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(path) => Ok(path.clone()),
            None => Ok(crate::store::default_data_dir()?),
        }
    }

    /// Provider id, treating a blank value as signed out.
    pub fn provider(&self) -> Option<&str> {
        self.provider_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Get the global config directory path.
///
/// Returns `~/.config/servicefinder/` on all Unix-like systems.
/// Respects `XDG_CONFIG_HOME` if set.
pub fn config_dir() -> Result<PathBuf> {
    let base = if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg)
    } else {
        dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            .join(".config")
    };

    Ok(base.join("servicefinder"))
}

/// Get the path to the global config file.
pub fn global_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.ccl"))
}

/// Load the global configuration.
pub fn load_config() -> Result<FinderConfig> {
    load_config_from(&global_config_path()?)
}

/// Load configuration from a specific file. A missing file yields defaults.
pub fn load_config_from(config_path: &Path) -> Result<FinderConfig> {
    if !config_path.exists() {
        return Ok(FinderConfig::default());
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    sickle::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Generate a commented config file.
pub fn generate_config_ccl(config: &FinderConfig) -> String {
    let mut output = String::new();
    output.push_str("/= servicefinder configuration\n");
    output.push_str("/= Command-line flags take precedence over these values.\n\n");

    if let Some(ref path) = config.catalogue_file {
        let _ = writeln!(output, "catalogue_file = {}", path.display());
    } else {
        output.push_str("/= catalogue_file = /path/to/catalogues.ccl\n");
    }

    if let Some(ref path) = config.data_dir {
        let _ = writeln!(output, "data_dir = {}", path.display());
    } else {
        output.push_str("/= data_dir = /path/to/listings\n");
    }

    if let Some(provider) = config.provider() {
        let _ = writeln!(output, "provider_id = {provider}");
    } else {
        output.push_str("/= provider_id = your-provider-id\n");
    }

    output
}

/// Save the global configuration.
pub fn save_config(config: &FinderConfig) -> Result<PathBuf> {
    let config_path = global_config_path()?;
    save_config_to(config, &config_path)?;
    Ok(config_path)
}

/// Save configuration to a specific file, creating parent directories.
pub fn save_config_to(config: &FinderConfig, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    fs::write(config_path, generate_config_ccl(config))
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    Ok(())
}
