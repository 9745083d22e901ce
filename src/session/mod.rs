//! One prayer-time screen session.
//!
//! A [`Session`] owns everything that lives while the screen is active: the
//! position, today's timings, the static Qibla bearing, the countdown timer
//! and the heading subscription. It is built in two phases:
//!
//! 1. One-shot inputs: locate, fetch timings. If either fails the error is
//!    shown, returned, and no periodic source is started.
//! 2. Periodic sources: the countdown timer and the heading subscription.
//!
//! Closing or dropping the session cancels both periodic sources. After that
//! nothing further reaches the display.

pub mod display;
#[cfg(any(test, feature = "testing-support"))]
pub mod recording;

#[cfg(test)]
mod tests;

pub use display::{SessionDisplay, SharedDisplay, TerminalDisplay};

use anyhow::Result;
use std::ops::ControlFlow;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::countdown::{CountdownEvent, CountdownScheduler};
use crate::error::EngineError;
use crate::geo::geocode::resolve_label;
use crate::geo::{
    ConfiguredLocation, GeoPosition, LocationSource, NominatimGeocoder, ReverseGeocoder,
};
use crate::qibla::orientation::heading_source_from_setting;
use crate::qibla::{self, HeadingSource, OrientationCorrector};
use crate::time_source::TimeSource;
use crate::timer::{TaskHandle, schedule};
use crate::timings::{
    AladhanProvider, NextPrayer, PrayerTimingSet, TimingProvider, location_date, select,
};

/// Messages delivered to whoever drives the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The countdown reached its target. The countdown is now idle until the
    /// owner calls [`Session::rearm`].
    Arrived(crate::timings::Prayer),
    /// The host is going away (signal, end of simulation).
    Shutdown,
}

/// Collaborators and settings for [`Session::start`].
pub struct SessionParams {
    pub location: Box<dyn LocationSource>,
    pub provider: Box<dyn TimingProvider>,
    pub geocoder: Option<Box<dyn ReverseGeocoder>>,
    pub heading: Box<dyn HeadingSource>,
    pub display: SharedDisplay,
    pub events: Sender<SessionEvent>,
    pub clock: Arc<dyn TimeSource>,
    pub method: u8,
    pub tick_interval: Duration,
}

impl SessionParams {
    /// Wire the stock collaborators from configuration.
    ///
    /// CLI coordinates take precedence over configured ones.
    pub fn from_config(
        config: &Config,
        cli_latitude: Option<f64>,
        cli_longitude: Option<f64>,
        display: SharedDisplay,
        events: Sender<SessionEvent>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        let geocoder: Option<Box<dyn ReverseGeocoder>> = if config.reverse_geocode() {
            Some(Box::new(NominatimGeocoder::new(
                config.geocode_url(),
                config.request_timeout(),
            )?))
        } else {
            None
        };

        Ok(Self {
            location: Box::new(ConfiguredLocation::from_config(
                config,
                cli_latitude,
                cli_longitude,
            )),
            provider: Box::new(AladhanProvider::new(
                config.timings_url(),
                config.request_timeout(),
            )?),
            geocoder,
            heading: heading_source_from_setting(config.heading_source())?,
            display,
            events,
            clock,
            method: config.method(),
            tick_interval: config.tick_interval(),
        })
    }
}

/// Live state of an active prayer-time screen.
pub struct Session {
    position: GeoPosition,
    timings: PrayerTimingSet,
    static_bearing: f64,
    next: NextPrayer,
    provider: Box<dyn TimingProvider>,
    display: SharedDisplay,
    events: Sender<SessionEvent>,
    clock: Arc<dyn TimeSource>,
    method: u8,
    tick_interval: Duration,
    scheduler: Arc<Mutex<CountdownScheduler>>,
    countdown_task: Option<TaskHandle>,
    heading_task: Option<TaskHandle>,
}

impl Session {
    /// Acquire the one-shot inputs, then arm the countdown and subscribe to
    /// the heading stream.
    ///
    /// Engine failures are shown on the display and returned as an
    /// [`EngineError`] inside the `anyhow` error.
    pub fn start(params: SessionParams) -> Result<Self> {
        let SessionParams {
            location,
            provider,
            geocoder,
            heading,
            display,
            events,
            clock,
            method,
            tick_interval,
        } = params;

        log_debug!("Requesting location from {}", location.describe());
        let position = match location.locate() {
            Ok(position) => position,
            Err(e) => return Err(fail(&display, EngineError::from(e))),
        };

        let date = location_date(position, clock.now());
        let timings = match provider.fetch(position, method, date) {
            Ok(timings) => timings,
            Err(e) => return Err(fail(&display, e)),
        };

        let label = resolve_label(geocoder.as_deref(), position);
        let static_bearing = qibla::bearing(position.latitude(), position.longitude());

        display::with_display(&display, |d| {
            d.show_location(position, &label);
            d.show_timings(&timings);
            d.show_qibla(static_bearing);
        });

        let now = clock.now().with_timezone(&timings.timezone());
        let next = select(&timings, now.time());

        let mut session = Self {
            position,
            timings,
            static_bearing,
            next,
            provider,
            display,
            events,
            clock,
            method,
            tick_interval,
            scheduler: Arc::new(Mutex::new(CountdownScheduler::new())),
            countdown_task: None,
            heading_task: None,
        };

        session.arm(next)?;
        session.subscribe_heading(heading)?;

        Ok(session)
    }

    pub fn position(&self) -> GeoPosition {
        self.position
    }

    pub fn timings(&self) -> &PrayerTimingSet {
        &self.timings
    }

    pub fn static_bearing(&self) -> f64 {
        self.static_bearing
    }

    pub fn next_prayer(&self) -> NextPrayer {
        self.next
    }

    /// True while the countdown timer is still running.
    pub fn is_counting(&self) -> bool {
        self.countdown_task
            .as_ref()
            .is_some_and(|task| task.is_active())
    }

    /// Select the prayer after the one that just arrived and count down to it.
    ///
    /// When the location's calendar day has moved past the day the timings
    /// were issued for, today's timings are fetched first. A failed refresh
    /// is shown and returned; the session should then be closed.
    pub fn rearm(&mut self) -> Result<()> {
        let now = self.clock.now().with_timezone(&self.timings.timezone());

        if now.date_naive() != self.timings.date() {
            log_decorated!("New day, refreshing prayer times...");
            match self.provider.fetch(self.position, self.method, now.date_naive()) {
                Ok(timings) => {
                    self.timings = timings;
                    display::with_display(&self.display, |d| d.show_timings(&self.timings));
                }
                Err(e) => return Err(fail(&self.display, e)),
            }
        }

        let next = select(&self.timings, now.time());
        self.arm(next)
    }

    /// Cancel the countdown timer and the heading subscription. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut task) = self.countdown_task.take() {
            task.cancel();
        }
        if let Some(mut task) = self.heading_task.take() {
            task.cancel();
        }
    }

    fn arm(&mut self, next: NextPrayer) -> Result<()> {
        if let Some(mut task) = self.countdown_task.take() {
            task.cancel();
        }

        let now = self.clock.now();
        let first_event = {
            let mut scheduler = lock(&self.scheduler);
            let target = scheduler.arm(next, self.timings.timezone(), now)?;
            display::with_display(&self.display, |d| d.show_next_prayer(next, target));
            scheduler.tick(now)
        };
        self.next = next;

        // Render immediately rather than leaving the countdown blank for one tick
        if let Some(CountdownEvent::Tick(countdown)) = first_event {
            display::with_display(&self.display, |d| d.show_countdown(countdown));
        }

        let scheduler = Arc::clone(&self.scheduler);
        let display = Arc::clone(&self.display);
        let clock = Arc::clone(&self.clock);
        let events = self.events.clone();

        let task = schedule("countdown", self.tick_interval, move || {
            let event = lock(&scheduler).tick(clock.now());
            match event {
                Some(CountdownEvent::Tick(countdown)) => {
                    display::with_display(&display, |d| d.show_countdown(countdown));
                    ControlFlow::Continue(())
                }
                Some(CountdownEvent::Arrived(prayer)) => {
                    display::with_display(&display, |d| d.show_arrived(prayer));
                    let _ = events.send(SessionEvent::Arrived(prayer));
                    ControlFlow::Break(())
                }
                None => ControlFlow::Break(()),
            }
        })?;

        self.countdown_task = Some(task);
        Ok(())
    }

    fn subscribe_heading(&mut self, source: Box<dyn HeadingSource>) -> Result<()> {
        let display = Arc::clone(&self.display);
        let corrector = OrientationCorrector::new(self.static_bearing);

        self.heading_task = corrector.attach(source, move |heading, pointer| {
            display::with_display(&display, |d| d.show_pointer(heading, pointer));
        })?;

        if self.heading_task.is_none() {
            log_debug!("No heading source; showing the static bearing only");
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn fail(display: &SharedDisplay, error: EngineError) -> anyhow::Error {
    display::with_display(display, |d| d.show_error(&error));
    anyhow::Error::new(error)
}

fn lock(scheduler: &Mutex<CountdownScheduler>) -> std::sync::MutexGuard<'_, CountdownScheduler> {
    scheduler.lock().unwrap_or_else(|e| e.into_inner())
}
