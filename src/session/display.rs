//! Where a session's output goes.

use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::{Arc, Mutex};

use crate::common::utils::compass_point;
use crate::countdown::Countdown;
use crate::error::EngineError;
use crate::geo::GeoPosition;
use crate::timings::{NextPrayer, Prayer, PrayerTimingSet};

/// Receives everything a session wants the user to see.
///
/// Calls arrive from the session's own thread and from its timer and heading
/// threads, always one at a time through [`SharedDisplay`].
pub trait SessionDisplay: Send {
    fn show_location(&mut self, position: GeoPosition, label: &str);
    fn show_timings(&mut self, timings: &PrayerTimingSet);
    fn show_next_prayer(&mut self, next: NextPrayer, target: DateTime<Tz>);
    fn show_countdown(&mut self, remaining: Countdown);
    fn show_arrived(&mut self, prayer: Prayer);
    fn show_qibla(&mut self, bearing: f64);
    fn show_pointer(&mut self, heading: f64, pointer: f64);
    fn show_error(&mut self, error: &EngineError);
}

pub type SharedDisplay = Arc<Mutex<dyn SessionDisplay>>;

/// Run `f` against the display, recovering from a poisoned lock.
pub fn with_display<F>(display: &SharedDisplay, f: F)
where
    F: FnOnce(&mut dyn SessionDisplay),
{
    let mut guard = display.lock().unwrap_or_else(|e| e.into_inner());
    f(&mut *guard);
}

/// Box-drawing terminal output.
///
/// The countdown rewrites one line in place. When output goes to a log file
/// it is written as a normal line, once per minute.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    last_logged_minute: Option<u64>,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedDisplay {
        Arc::new(Mutex::new(self))
    }
}

impl SessionDisplay for TerminalDisplay {
    fn show_location(&mut self, position: GeoPosition, label: &str) {
        log_block_start!("Prayer times for {label}");
        log_indented!("Coordinates: {position}");
    }

    fn show_timings(&mut self, timings: &PrayerTimingSet) {
        log_block_start!(
            "Schedule for {} ({})",
            timings.date().format("%A, %B %-d"),
            timings.timezone()
        );
        for (prayer, time) in timings.iter() {
            log_indented!("{:<8} {}", prayer.name(), time.format("%H:%M"));
        }
    }

    fn show_next_prayer(&mut self, next: NextPrayer, target: DateTime<Tz>) {
        log_block_start!("Next prayer: {} at {}", next.prayer, next.time.format("%H:%M"));
        log_indented!("Target: {}", target.format("%Y-%m-%d %H:%M:%S %Z"));
        self.last_logged_minute = None;
    }

    fn show_countdown(&mut self, remaining: Countdown) {
        let line = format!("┃   Time remaining: {remaining}");
        if crate::logger::write_live(&line) {
            return;
        }
        let minute = remaining.total_seconds() / 60;
        if self.last_logged_minute != Some(minute) {
            self.last_logged_minute = Some(minute);
            log_indented!("Time remaining: {remaining}");
        }
    }

    fn show_arrived(&mut self, prayer: Prayer) {
        log_block_start!("It is time for {prayer}");
    }

    fn show_qibla(&mut self, bearing: f64) {
        log_block_start!("Qibla direction: {bearing:.1}° ({})", compass_point(bearing));
    }

    fn show_pointer(&mut self, heading: f64, pointer: f64) {
        log_decorated!("Heading {heading:.0}°, Qibla pointer at {pointer:.1}°");
    }

    fn show_error(&mut self, error: &EngineError) {
        log_debug!("{error}");
        log_error_exit!("{}", error.user_message());
    }
}
