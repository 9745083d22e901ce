//! Timing provider adapter.
//!
//! Converts a position and a calendar day into five prayer clock times using
//! an external timing service. The calculation method is opaque here and is
//! forwarded to the service unchanged.

use anyhow::Context;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::PrayerTimingSet;
use crate::common::constants::USER_AGENT;
use crate::error::EngineError;
use crate::geo::{GeoPosition, determine_timezone_from_coordinates};

/// Source of daily prayer timings for a position.
#[cfg_attr(test, mockall::automock)]
pub trait TimingProvider: Send {
    /// Fetch the timings for `date`, a calendar day at the position.
    ///
    /// No retry is performed; failures go to the caller.
    fn fetch(
        &self,
        position: GeoPosition,
        method: u8,
        date: NaiveDate,
    ) -> Result<PrayerTimingSet, EngineError>;
}

#[derive(Debug, Deserialize)]
struct TimingsEnvelope {
    data: TimingsData,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: HashMap<String, String>,
    #[serde(default)]
    meta: Option<TimingsMeta>,
}

#[derive(Debug, Deserialize)]
struct TimingsMeta {
    timezone: Option<String>,
}

/// Parse an Aladhan `timings` payload requested for `date`.
///
/// The zone comes from `meta.timezone` when it names an IANA zone, otherwise
/// from the coordinates. The set is dated with the requested day, so a
/// session compares its clock against the day it asked for.
pub fn parse_timings_payload(
    payload: &str,
    position: GeoPosition,
    date: NaiveDate,
) -> Result<PrayerTimingSet, EngineError> {
    let envelope: TimingsEnvelope = serde_json::from_str(payload)
        .map_err(|e| EngineError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let data = envelope.data;

    let timezone = data
        .meta
        .and_then(|meta| meta.timezone)
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or_else(|| {
            determine_timezone_from_coordinates(position.latitude(), position.longitude())
        });

    PrayerTimingSet::from_map(&data.timings, timezone, date)
}

/// Timing provider backed by the Aladhan prayer times API.
pub struct AladhanProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl AladhanProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for the timing provider")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, position: GeoPosition, method: u8, date: NaiveDate) -> reqwest::Result<String> {
        self.client
            .get(format!("{}/timings/{}", self.base_url, date.format("%d-%m-%Y")))
            .query(&[
                ("latitude", position.latitude().to_string()),
                ("longitude", position.longitude().to_string()),
                ("method", method.to_string()),
            ])
            .send()?
            .error_for_status()?
            .text()
    }
}

impl TimingProvider for AladhanProvider {
    fn fetch(
        &self,
        position: GeoPosition,
        method: u8,
        date: NaiveDate,
    ) -> Result<PrayerTimingSet, EngineError> {
        log_debug!("Requesting prayer times for {date} at {position}");
        let body = self
            .request(position, method, date)
            .map_err(|e| EngineError::ProviderUnavailable(e.to_string()))?;

        parse_timings_payload(&body, position, date)
    }
}
