//! Configuration loading functionality.
//!
//! Resolves the config path, creates a default file when none exists, parses
//! TOML, applies `geo.toml` overrides and validates the result.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::validation::validate_config;
use super::{Config, GeoConfig};
use crate::common::utils::private_path;

const CONFIG_FILE_NAME: &str = "miqat.toml";
const GEO_FILE_NAME: &str = "geo.toml";

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// Can only be called once; later calls return an error.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// The directory given with `--config`, if any.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path to `miqat.toml`, honouring `--config`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("miqat").join(CONFIG_FILE_NAME))
}

/// Path to `geo.toml`, next to `miqat.toml`.
pub fn get_geo_path() -> Result<PathBuf> {
    let config_path = get_config_path()?;
    config_path
        .parent()
        .map(|dir| dir.join(GEO_FILE_NAME))
        .context("Could not determine config directory")
}

/// Load configuration from the default location, creating it if missing.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!("Created default configuration");
        log_indented!("{}", private_path(&config_path));
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// Does not create a default config when the path doesn't exist.
pub fn load_from_path(path: &PathBuf) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at {}",
            private_path(path)
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    // geo.toml values are validated together with the main file
    apply_geo_override(&mut config, path);

    validate_config(&config)?;

    Ok(config)
}

/// Apply `geo.toml` coordinates found next to `config_path`.
///
/// The file is optional. An unreadable or malformed file is reported and
/// ignored.
fn apply_geo_override(config: &mut Config, config_path: &Path) {
    let Some(geo_path) = config_path.parent().map(|dir| dir.join(GEO_FILE_NAME)) else {
        return;
    };
    if !geo_path.exists() {
        return;
    }

    let geo = fs::read_to_string(&geo_path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str::<GeoConfig>(&content).map_err(|e| e.to_string()));

    match geo {
        Ok(geo) => {
            config.latitude = geo.latitude.or(config.latitude);
            config.longitude = geo.longitude.or(config.longitude);
        }
        Err(e) => {
            log_warning!("Ignoring geo.toml ({e}); using coordinates from miqat.toml");
        }
    }
}
