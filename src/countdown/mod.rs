//! Countdown to the selected prayer.
//!
//! [`CountdownScheduler`] is a plain state machine (`Idle → Running → Arrived`)
//! evaluated against explicit instants. Driving it once per interval is the job
//! of [`crate::timer::schedule`], which keeps the state machine testable
//! without real time passing.
//!
//! Arrival is terminal. The scheduler never re-arms itself; the caller selects
//! the following prayer and calls [`CountdownScheduler::arm`] again.


use anyhow::{Context, Result};
use chrono::{
    DateTime, Days, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
};
use chrono_tz::Tz;
use std::fmt;

use crate::timings::{NextPrayer, Prayer};

/// Remaining time split into whole hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub hours: u64,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    /// Floor-decompose a number of whole seconds.
    pub fn from_seconds(total_seconds: u64) -> Self {
        Self {
            hours: total_seconds / 3600,
            minutes: ((total_seconds % 3600) / 60) as u32,
            seconds: (total_seconds % 60) as u32,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.hours * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m {}s", self.hours, self.minutes, self.seconds)
    }
}

/// What a single evaluation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Tick(Countdown),
    /// The target instant has been reached. Emitted exactly once per arming.
    Arrived(Prayer),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountdownState {
    Idle,
    Running {
        prayer: Prayer,
        target: DateTime<Tz>,
    },
    Arrived {
        prayer: Prayer,
    },
}

/// State machine counting down to one prayer instant.
#[derive(Debug, Clone)]
pub struct CountdownScheduler {
    state: CountdownState,
}

impl Default for CountdownScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl CountdownScheduler {
    pub fn new() -> Self {
        Self {
            state: CountdownState::Idle,
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    /// Enter `Running` for `next`, placing its clock time on a calendar day.
    ///
    /// The target is today (in `timezone`) at `next.time`, or tomorrow when
    /// that instant is not strictly after `now`. Arming again from any state
    /// replaces the previous target.
    pub fn arm(
        &mut self,
        next: NextPrayer,
        timezone: Tz,
        now: DateTime<Local>,
    ) -> Result<DateTime<Tz>> {
        let target = place_target(next.time, timezone, now)?;
        self.state = CountdownState::Running {
            prayer: next.prayer,
            target,
        };
        Ok(target)
    }

    /// Re-evaluate at `now`.
    ///
    /// Returns `None` unless running. Once the remaining time reaches zero the
    /// scheduler moves to `Arrived`, returns the arrival event once, and stays
    /// silent afterwards.
    pub fn tick(&mut self, now: DateTime<Local>) -> Option<CountdownEvent> {
        let CountdownState::Running { prayer, target } = self.state else {
            return None;
        };

        let remaining_ms = target.timestamp_millis() - now.timestamp_millis();
        if remaining_ms <= 0 {
            self.state = CountdownState::Arrived { prayer };
            return Some(CountdownEvent::Arrived(prayer));
        }

        Some(CountdownEvent::Tick(Countdown::from_seconds(
            (remaining_ms / 1000) as u64,
        )))
    }
}

/// Place a clock time on today's date in `timezone`, or tomorrow's if today's
/// instant is not strictly after `now`.
pub fn place_target(time: NaiveTime, timezone: Tz, now: DateTime<Local>) -> Result<DateTime<Tz>> {
    let now_in_tz = now.with_timezone(&timezone);
    let today = now_in_tz.date_naive();

    let candidate = localize(timezone, today, time)?;
    if candidate > now_in_tz {
        return Ok(candidate);
    }

    let tomorrow = today
        .checked_add_days(Days::new(1))
        .context("Date overflow while placing countdown target")?;
    localize(timezone, tomorrow, time)
}

/// Resolve a local wall-clock time, taking the earliest instant when the time
/// is ambiguous. A time inside a DST gap is read with the offset in force
/// before the gap, which moves it forward by exactly the gap's length.
fn localize(timezone: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>> {
    let naive: NaiveDateTime = date.and_time(time);
    if let Some(resolved) = timezone.from_local_datetime(&naive).earliest() {
        return Ok(resolved);
    }

    let before_gap = timezone
        .from_local_datetime(&(naive - Duration::days(1)))
        .earliest()
        .with_context(|| format!("{naive} does not exist in timezone {timezone}"))?
        .offset()
        .fix();
    let utc = naive - Duration::seconds(i64::from(before_gap.local_minus_utc()));
    Ok(timezone.from_utc_datetime(&utc))
}
