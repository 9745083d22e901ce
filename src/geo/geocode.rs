//! Reverse geocoding for the location label.
//!
//! The label is cosmetic. A failed lookup never fails the session; it only
//! degrades the label to [`UNKNOWN_LOCATION_LABEL`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use super::GeoPosition;
use crate::common::constants::{UNKNOWN_LOCATION_LABEL, USER_AGENT};

/// Turns a position into a human-readable place name.
pub trait ReverseGeocoder: Send {
    fn lookup(&self, position: GeoPosition) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Address,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

/// Pick city, then town, then village from a Nominatim `reverse` payload.
pub fn label_from_payload(payload: &str) -> Result<String> {
    let response: ReverseResponse =
        serde_json::from_str(payload).context("Failed to parse reverse geocoding response")?;
    let Address {
        city,
        town,
        village,
    } = response.address;

    Ok(city
        .or(town)
        .or(village)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_LOCATION_LABEL.to_string()))
}

/// Reverse geocoder backed by an OpenStreetMap Nominatim endpoint.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for reverse geocoding")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn lookup(&self, position: GeoPosition) -> Result<String> {
        let url = format!("{}/reverse", self.base_url);
        let body = self
            .client
            .get(&url)
            .query(&[
                ("lat", position.latitude().to_string()),
                ("lon", position.longitude().to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("Reverse geocoding request to {url} failed"))?
            .text()
            .context("Failed to read reverse geocoding response")?;

        label_from_payload(&body)
    }
}

/// Resolve a label, degrading any failure to the unknown-location label.
pub fn resolve_label(geocoder: Option<&dyn ReverseGeocoder>, position: GeoPosition) -> String {
    let Some(geocoder) = geocoder else {
        return UNKNOWN_LOCATION_LABEL.to_string();
    };

    match geocoder.lookup(position) {
        Ok(label) => label,
        Err(e) => {
            log_warning!("Could not resolve location name: {e}");
            UNKNOWN_LOCATION_LABEL.to_string()
        }
    }
}
