//! One-shot geolocation sources.
//!
//! A terminal has no positioning hardware, so the stock source reads the fix
//! from the command line or the configuration file. Other sources (GPS
//! daemons, platform services) plug in through [`LocationSource`].

use super::GeoPosition;
use crate::error::GeolocationError;

/// Supplies a single position fix for a session.
pub trait LocationSource: Send {
    /// Request one fix. Implementations must not retry internally.
    fn locate(&self) -> Result<GeoPosition, GeolocationError>;

    /// Short description used in debug logs.
    fn describe(&self) -> String;
}

/// Location taken from CLI flags or `miqat.toml`.
#[derive(Debug, Clone)]
pub struct ConfiguredLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
    enabled: bool,
}

impl ConfiguredLocation {
    pub fn new(latitude: Option<f64>, longitude: Option<f64>, enabled: bool) -> Self {
        Self {
            latitude,
            longitude,
            enabled,
        }
    }

    /// Build from configuration, letting CLI coordinates take precedence.
    pub fn from_config(
        config: &crate::config::Config,
        cli_latitude: Option<f64>,
        cli_longitude: Option<f64>,
    ) -> Self {
        Self::new(
            cli_latitude.or(config.latitude),
            cli_longitude.or(config.longitude),
            config.location_enabled(),
        )
    }
}

impl LocationSource for ConfiguredLocation {
    fn locate(&self) -> Result<GeoPosition, GeolocationError> {
        if !self.enabled {
            return Err(GeolocationError::PermissionDenied);
        }

        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                GeoPosition::new(lat, lon).map_err(|_| GeolocationError::PositionUnavailable)
            }
            _ => Err(GeolocationError::PositionUnavailable),
        }
    }

    fn describe(&self) -> String {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => format!("configured coordinates ({lat:.4}, {lon:.4})"),
            _ => "configured coordinates (missing)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_location_success() {
        let source = ConfiguredLocation::new(Some(21.0), Some(39.0), true);
        let position = source.locate().unwrap();
        assert_eq!(position.latitude(), 21.0);
        assert_eq!(position.longitude(), 39.0);
    }

    #[test]
    fn test_disabled_location_is_denied() {
        let source = ConfiguredLocation::new(Some(21.0), Some(39.0), false);
        assert_eq!(source.locate(), Err(GeolocationError::PermissionDenied));
    }

    #[test]
    fn test_missing_or_invalid_coordinates_are_unavailable() {
        let missing = ConfiguredLocation::new(Some(21.0), None, true);
        assert_eq!(missing.locate(), Err(GeolocationError::PositionUnavailable));

        let invalid = ConfiguredLocation::new(Some(120.0), Some(39.0), true);
        assert_eq!(invalid.locate(), Err(GeolocationError::PositionUnavailable));
    }
}
