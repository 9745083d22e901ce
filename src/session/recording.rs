//! In-memory display for tests.

use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::{Arc, Mutex};

use super::display::{SessionDisplay, SharedDisplay};
use crate::countdown::Countdown;
use crate::error::EngineError;
use crate::geo::GeoPosition;
use crate::timings::{NextPrayer, Prayer, PrayerTimingSet};

/// One call received by a [`RecordingDisplay`].
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Location(String),
    Timings(Vec<(Prayer, String)>),
    NextPrayer(Prayer, DateTime<Tz>),
    Countdown(String),
    Arrived(Prayer),
    Qibla(f64),
    Pointer(f64, f64),
    Error(String),
}

#[derive(Debug, Default)]
pub struct RecordingDisplay {
    shown: Vec<Shown>,
}

impl RecordingDisplay {
    /// A fresh recorder plus the handle to pass to a session.
    pub fn shared() -> (Arc<Mutex<RecordingDisplay>>, SharedDisplay) {
        let recorder = Arc::new(Mutex::new(RecordingDisplay::default()));
        let display: SharedDisplay = recorder.clone();
        (recorder, display)
    }

    pub fn shown(&self) -> &[Shown] {
        &self.shown
    }

    pub fn countdowns(&self) -> Vec<String> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Countdown(c) => Some(c.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Error(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}

impl SessionDisplay for RecordingDisplay {
    fn show_location(&mut self, _position: GeoPosition, label: &str) {
        self.shown.push(Shown::Location(label.to_string()));
    }

    fn show_timings(&mut self, timings: &PrayerTimingSet) {
        let rows = timings
            .iter()
            .map(|(p, t)| (p, t.format("%H:%M").to_string()))
            .collect();
        self.shown.push(Shown::Timings(rows));
    }

    fn show_next_prayer(&mut self, next: NextPrayer, target: DateTime<Tz>) {
        self.shown.push(Shown::NextPrayer(next.prayer, target));
    }

    fn show_countdown(&mut self, remaining: Countdown) {
        self.shown.push(Shown::Countdown(remaining.to_string()));
    }

    fn show_arrived(&mut self, prayer: Prayer) {
        self.shown.push(Shown::Arrived(prayer));
    }

    fn show_qibla(&mut self, bearing: f64) {
        self.shown.push(Shown::Qibla(bearing));
    }

    fn show_pointer(&mut self, heading: f64, pointer: f64) {
        self.shown.push(Shown::Pointer(heading, pointer));
    }

    fn show_error(&mut self, error: &EngineError) {
        self.shown.push(Shown::Error(error.user_message().to_string()));
    }
}
