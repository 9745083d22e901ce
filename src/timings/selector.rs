//! Next-prayer selection.
//!
//! Selection only answers "which clock time comes next". Placing that time
//! on a calendar day is the countdown's job, so a wrapped Fajr is never
//! mistaken for a time later today.

use chrono::NaiveTime;

use super::{NextPrayer, Prayer, PrayerTimingSet};

/// Return the first prayer whose time is strictly after `now`.
///
/// A prayer whose time equals `now` has already passed. When every prayer has
/// passed (at or after Isha), wrap to Fajr of the same set.
pub fn select(timings: &PrayerTimingSet, now: NaiveTime) -> NextPrayer {
    timings
        .iter()
        .find(|(_, time)| *time > now)
        .map(|(prayer, time)| NextPrayer { prayer, time })
        .unwrap_or_else(|| NextPrayer {
            prayer: Prayer::Fajr,
            time: timings.time(Prayer::Fajr),
        })
}
