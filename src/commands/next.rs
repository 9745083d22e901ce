//! `miqat next`: print the upcoming prayer and the time left until it.

use anyhow::Result;
use chrono::{DateTime, Local};
use chrono_tz::Tz;

use crate::args::SessionOptions;
use crate::config::Config;
use crate::countdown::{Countdown, CountdownEvent, CountdownScheduler};
use crate::geo::{ConfiguredLocation, LocationSource};
use crate::time_source;
use crate::timings::{AladhanProvider, NextPrayer, TimingProvider, location_date, select};

/// The answer printed by `miqat next`.
#[derive(Debug, Clone, PartialEq)]
pub struct NextSummary {
    pub next: NextPrayer,
    pub target: DateTime<Tz>,
    pub remaining: Countdown,
}

/// Locate, fetch today's timings and count down from `now` once.
pub fn next_summary(
    location: &dyn LocationSource,
    provider: &dyn TimingProvider,
    method: u8,
    now: DateTime<Local>,
) -> Result<NextSummary> {
    let position = location.locate().map_err(|e| super::report(e.into()))?;
    let timings = provider
        .fetch(position, method, location_date(position, now))
        .map_err(super::report)?;

    let local_now = now.with_timezone(&timings.timezone());
    let next = select(&timings, local_now.time());

    let mut scheduler = CountdownScheduler::new();
    let target = scheduler.arm(next, timings.timezone(), now)?;
    let remaining = match scheduler.tick(now) {
        Some(CountdownEvent::Tick(remaining)) => remaining,
        _ => Countdown::from_seconds(0),
    };

    Ok(NextSummary {
        next,
        target,
        remaining,
    })
}

pub fn handle_next_command(options: &SessionOptions) -> Result<()> {
    log_version!();

    let config = Config::load()?;
    let location =
        ConfiguredLocation::from_config(&config, options.latitude, options.longitude);
    let provider = AladhanProvider::new(config.timings_url(), config.request_timeout())?;

    let summary = next_summary(&location, &provider, config.method(), time_source::now())?;

    log_block_start!(
        "Next prayer: {} at {}",
        summary.next.prayer,
        summary.next.time.format("%H:%M")
    );
    log_indented!("Time remaining: {}", summary.remaining);
    log_indented!("Target: {}", summary.target.format("%Y-%m-%d %H:%M %Z"));
    log_end!();
    Ok(())
}
