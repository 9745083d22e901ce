//! Geographic inputs to a session.
//!
//! ## Module Structure
//!
//! - [`location`]: one-shot geolocation sources producing a [`GeoPosition`]
//! - [`geocode`]: optional reverse geocoding for a human-readable label
//! - [`timezone`]: coordinate to IANA timezone lookup
//!
//! A [`GeoPosition`] can only be built through [`GeoPosition::new`], which
//! rejects out-of-range or non-finite coordinates. Everything downstream (the
//! timing adapter, the Qibla calculator) can therefore assume valid input.

pub mod geocode;
pub mod location;
pub mod timezone;

pub use geocode::{NominatimGeocoder, ReverseGeocoder};
pub use location::{ConfiguredLocation, LocationSource};
pub use timezone::determine_timezone_from_coordinates;

use anyhow::Result;
use std::fmt;

/// A validated observer position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    latitude: f64,
    longitude: f64,
}

impl GeoPosition {
    /// Build a position, rejecting latitudes outside [-90, 90] and longitudes
    /// outside [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            anyhow::bail!("latitude must be between -90 and 90 degrees (got {latitude})");
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            anyhow::bail!("longitude must be between -180 and 180 degrees (got {longitude})");
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{ns}, {:.4}°{ew}",
            self.latitude.abs(),
            self.longitude.abs()
        )
    }
}
