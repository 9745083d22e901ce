//! `miqat simulate`: run the live screen against an accelerated clock.
//!
//! The range is read as wall-clock time at the prayer location when its
//! coordinates are known, otherwise as machine-local time. Once the simulated
//! time source is installed every "now" in the engine reads from it, so the
//! countdown, arrivals and day rollovers play out exactly as they would live.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use std::sync::Arc;

use crate::args::SessionOptions;
use crate::config::Config;
use crate::geo::determine_timezone_from_coordinates;
use crate::logger::Log;
use crate::time_source::{self, SimulatedTimeSource, parse_datetime, parse_datetime_in_tz};

/// Simulated range resolved to instants.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRange {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    /// Zone the range was read in, when the location is known.
    pub timezone: Option<chrono_tz::Tz>,
}

/// Parse `start_time`/`end_time`, in `timezone` when given.
pub fn resolve_range(
    start_time: &str,
    end_time: &str,
    timezone: Option<chrono_tz::Tz>,
) -> Result<SimulationRange> {
    let parse = |s: &str| -> Result<DateTime<Local>> {
        let parsed = match timezone {
            Some(tz) => parse_datetime_in_tz(s, tz).map(|t| t.with_timezone(&Local)),
            None => parse_datetime(s),
        };
        parsed.map_err(|e| anyhow!(e))
    };

    let start = parse(start_time).map_err(|e| e.context("Invalid start time"))?;
    let end = parse(end_time).map_err(|e| e.context("Invalid end time"))?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    Ok(SimulationRange {
        start,
        end,
        timezone,
    })
}

/// Install the simulated clock. The caller then runs the live screen.
pub fn handle_simulate_command(
    options: &SessionOptions,
    start_time: &str,
    end_time: &str,
    multiplier: f64,
) -> Result<()> {
    log_version!();
    log_block_start!("Simulation mode");

    let config = Config::load()?;
    let timezone = match (
        options.latitude.or(config.latitude),
        options.longitude.or(config.longitude),
    ) {
        (Some(lat), Some(lon)) => Some(determine_timezone_from_coordinates(lat, lon)),
        _ => None,
    };

    let range = resolve_range(start_time, end_time, timezone)?;

    match range.timezone {
        Some(tz) => log_indented!("Times are in {tz}"),
        None => log_indented!("Times are in the local timezone"),
    }
    log_indented!("From: {start_time}");
    log_indented!("To:   {end_time}");
    log_indented!("Speed: {multiplier}x");

    let span = range.end - range.start;
    let real_secs = span.num_milliseconds() as f64 / 1000.0 / multiplier;
    log_indented!("Runs for about {:.0} real seconds", real_secs.ceil());

    if let Some(tz) = range.timezone {
        Log::set_location_timezone(tz);
    }
    time_source::init_time_source(Arc::new(SimulatedTimeSource::new(
        range.start,
        range.end,
        multiplier,
    )));

    Ok(())
}
