//! Configuration validation.
//!
//! Each check names the offending field, its value and the permitted range.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;

pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    if let Some(method) = config.method
        && method > MAXIMUM_METHOD
    {
        anyhow::bail!(
            "method ({}) must be between 0 and {}",
            method,
            MAXIMUM_METHOD
        );
    }

    if let Some(timeout) = config.request_timeout
        && !(MINIMUM_REQUEST_TIMEOUT..=MAXIMUM_REQUEST_TIMEOUT).contains(&timeout)
    {
        anyhow::bail!(
            "request_timeout ({} s) must be between {} and {} seconds",
            timeout,
            MINIMUM_REQUEST_TIMEOUT,
            MAXIMUM_REQUEST_TIMEOUT
        );
    }

    if let Some(interval) = config.tick_interval_ms
        && !(MINIMUM_TICK_INTERVAL_MS..=MAXIMUM_TICK_INTERVAL_MS).contains(&interval)
    {
        anyhow::bail!(
            "tick_interval_ms ({} ms) must be between {} and {} milliseconds",
            interval,
            MINIMUM_TICK_INTERVAL_MS,
            MAXIMUM_TICK_INTERVAL_MS
        );
    }

    validate_url(config.timings_url.as_deref(), "timings_url")?;
    validate_url(config.geocode_url.as_deref(), "geocode_url")?;

    if let Some(source) = config.heading_source.as_deref()
        && source.trim().is_empty()
    {
        anyhow::bail!("heading_source must be \"none\", \"stdin\" or a path (got an empty string)");
    }

    Ok(())
}

fn validate_url(url: Option<&str>, field: &str) -> Result<()> {
    if let Some(url) = url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        anyhow::bail!("{} must be an http:// or https:// URL (got \"{}\")", field, url);
    }
    Ok(())
}
