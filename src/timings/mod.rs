//! Prayer timing data and the next-prayer selection rules.
//!
//! - [`provider`]: fetches a [`PrayerTimingSet`] for a position from the timing service
//! - [`selector`]: picks the upcoming prayer for a clock time
//!
//! A timing set is five clock times with no date attached. The date they were
//! issued for and the zone they are expressed in travel alongside so that the
//! countdown can place a selected time on the right calendar day.

pub mod provider;
pub mod selector;

#[cfg(test)]
mod tests;

pub use provider::{AladhanProvider, TimingProvider};
pub use selector::select;

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fmt;

use crate::error::EngineError;
use crate::geo::{GeoPosition, determine_timezone_from_coordinates};

/// The five canonical daily prayers in their fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// Declared order. Wraparound goes from the last entry back to the first.
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Key used by the timing service payload.
    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The prayer that comes next and its clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPrayer {
    pub prayer: Prayer,
    pub time: NaiveTime,
}

/// Clock times for all five prayers on one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct PrayerTimingSet {
    times: [NaiveTime; 5],
    timezone: Tz,
    date: NaiveDate,
}

impl PrayerTimingSet {
    /// Build from times given in [`Prayer::ALL`] order.
    pub fn new(times: [NaiveTime; 5], timezone: Tz, date: NaiveDate) -> Self {
        Self {
            times,
            timezone,
            date,
        }
    }

    /// Build from a name → `HH:MM` map as returned by the timing service.
    ///
    /// Unrelated keys are ignored. A missing canonical name or an unparseable
    /// time is a [`EngineError::MalformedResponse`].
    pub fn from_map(
        map: &HashMap<String, String>,
        timezone: Tz,
        date: NaiveDate,
    ) -> Result<Self, EngineError> {
        let mut times = [NaiveTime::MIN; 5];
        for prayer in Prayer::ALL {
            let raw = map.get(prayer.name()).ok_or_else(|| {
                EngineError::MalformedResponse(format!("missing timing for {prayer}"))
            })?;
            times[prayer.index()] = parse_clock_time(raw)?;
        }
        Ok(Self::new(times, timezone, date))
    }

    pub fn time(&self, prayer: Prayer) -> NaiveTime {
        self.times[prayer.index()]
    }

    /// Prayers with their times, in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (Prayer, NaiveTime)> + '_ {
        Prayer::ALL.into_iter().map(|p| (p, self.time(p)))
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Calendar day (in [`Self::timezone`]) these timings were issued for.
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Calendar day at `position` for the instant `now`.
///
/// This is the day to request timings for. The machine's own date is
/// irrelevant; only the position's zone counts.
pub fn location_date(position: GeoPosition, now: DateTime<Local>) -> NaiveDate {
    let timezone = determine_timezone_from_coordinates(position.latitude(), position.longitude());
    now.with_timezone(&timezone).date_naive()
}

/// Parse a 24-hour `HH:MM` clock time.
///
/// The timing service may append an annotation such as `" (+03)"`; anything
/// after the first whitespace is ignored.
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, EngineError> {
    let clock = raw.split_whitespace().next().unwrap_or("");
    NaiveTime::parse_from_str(clock, "%H:%M")
        .map_err(|e| EngineError::MalformedResponse(format!("invalid time '{raw}': {e}")))
}
