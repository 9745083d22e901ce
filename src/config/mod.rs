//! Configuration system for miqat.
//!
//! Settings come from `miqat.toml`, searched in `$XDG_CONFIG_HOME/miqat/`
//! unless `--config <dir>` names another directory. A commented default file
//! is written on first run.
//!
//! ```toml
//! #[Location]
//! location_enabled = true   # Allow reading the configured position
//! latitude = 21.422500      # Geographic latitude (-90 to 90)
//! longitude = 39.826200     # Geographic longitude (-180 to 180)
//!
//! #[Prayer times]
//! method = 2                # Calculation method (0-23)
//! timings_url = "https://api.aladhan.com/v1"
//! request_timeout = 10      # HTTP timeout in seconds (1-120)
//!
//! #[Display]
//! reverse_geocode = true    # Look up a place name for the coordinates
//! geocode_url = "https://nominatim.openstreetmap.org"
//! tick_interval_ms = 1000   # Countdown refresh period (100-60000)
//! heading_source = "none"   # "none", "stdin" or a path
//! ```
//!
//! Coordinates may also live in a separate `geo.toml` next to `miqat.toml`,
//! which overrides the main file. This keeps the location out of a config
//! that is shared or version controlled.

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Coordinates stored in the optional `geo.toml`.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GeoConfig {
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
}

/// Settings loaded from `miqat.toml`.
///
/// Every field is optional; the accessor methods apply defaults.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Latitude of the prayer location in degrees.
    pub latitude: Option<f64>,
    /// Longitude of the prayer location in degrees.
    pub longitude: Option<f64>,
    /// When false the location source reports a denied permission.
    pub location_enabled: Option<bool>,

    /// Calculation method id forwarded to the timing provider.
    pub method: Option<u8>,
    pub timings_url: Option<String>,
    /// HTTP timeout for provider and geocoder requests, in seconds.
    pub request_timeout: Option<u64>,

    pub reverse_geocode: Option<bool>,
    pub geocode_url: Option<String>,
    /// Countdown re-evaluation period in milliseconds.
    pub tick_interval_ms: Option<u64>,
    /// `"none"`, `"stdin"`, or a path to read heading samples from.
    pub heading_source: Option<String>,
}

impl Config {
    /// Load configuration using automatic path detection.
    pub fn load() -> Result<Self> {
        load()
    }

    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        load_from_path(path)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    /// Path of the private coordinates file next to `miqat.toml`.
    pub fn get_geo_path() -> Result<PathBuf> {
        loading::get_geo_path()
    }

    pub fn location_enabled(&self) -> bool {
        self.location_enabled.unwrap_or(DEFAULT_LOCATION_ENABLED)
    }

    pub fn method(&self) -> u8 {
        self.method.unwrap_or(DEFAULT_METHOD)
    }

    pub fn timings_url(&self) -> &str {
        self.timings_url.as_deref().unwrap_or(DEFAULT_TIMINGS_URL)
    }

    pub fn geocode_url(&self) -> &str {
        self.geocode_url.as_deref().unwrap_or(DEFAULT_GEOCODE_URL)
    }

    pub fn reverse_geocode(&self) -> bool {
        self.reverse_geocode.unwrap_or(DEFAULT_REVERSE_GEOCODE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.unwrap_or(DEFAULT_TICK_INTERVAL_MS))
    }

    pub fn heading_source(&self) -> &str {
        self.heading_source
            .as_deref()
            .unwrap_or(DEFAULT_HEADING_SOURCE)
    }

    /// Print the effective settings as a log block.
    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");

        if Self::get_geo_path().is_ok_and(|p| p.exists()) {
            log_indented!("Loaded coordinates from geo.toml");
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                let lat_dir = if lat >= 0.0 { "N" } else { "S" };
                let lon_dir = if lon >= 0.0 { "E" } else { "W" };
                log_indented!(
                    "Location: {:.4}°{}, {:.4}°{}",
                    lat.abs(),
                    lat_dir,
                    lon.abs(),
                    lon_dir
                );
            }
            _ => log_indented!("Location: not configured"),
        }
        if !self.location_enabled() {
            log_indented!("Location access: disabled");
        }

        log_indented!("Calculation method: {}", self.method());
        log_indented!("Timing provider: {}", self.timings_url());
        if self.reverse_geocode() {
            log_indented!("Place names: {}", self.geocode_url());
        }
        log_indented!("Request timeout: {}s", self.request_timeout().as_secs());
        log_indented!("Countdown refresh: {}ms", self.tick_interval().as_millis());
        log_indented!("Heading source: {}", self.heading_source());
    }
}

#[cfg(test)]
mod tests;
