//! Application coordinator for the live prayer-time screen.
//!
//! Loads configuration, installs signal handling, starts a [`Session`] and
//! then drives it: each arrival re-arms the countdown for the following
//! prayer, and a shutdown signal (or the end of a simulation) closes it.
//!
//! - Normal startup: `Miqat::new(options).run()`
//! - Simulation: `Miqat::new(options).without_headers().run()`

use anyhow::Result;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::args::SessionOptions;
use crate::common::constants::RUNNER_POLL_INTERVAL_MS;
use crate::config::Config;
use crate::logger::Log;
use crate::session::{Session, SessionEvent, SessionParams, TerminalDisplay};
use crate::signals::{SignalState, setup_signal_handler};
use crate::time_source;

/// Builder for running the live screen.
pub struct Miqat {
    options: SessionOptions,
    show_headers: bool,
}

impl Miqat {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            show_headers: true,
        }
    }

    /// Skip the version header (already printed by the caller).
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    /// Run until a shutdown signal arrives or the simulated clock runs out.
    ///
    /// Engine failures have already been shown when this returns them.
    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();
        }

        let config = Config::load()?;
        if self.options.debug_enabled {
            config.log_config();
        }

        let (tx, rx) = mpsc::channel();
        let signal_state = setup_signal_handler(tx.clone(), self.options.debug_enabled)?;

        let params = SessionParams::from_config(
            &config,
            self.options.latitude,
            self.options.longitude,
            TerminalDisplay::new().shared(),
            tx,
            time_source::source(),
        )?;

        let mut session = Session::start(params)?;
        Log::set_location_timezone(session.timings().timezone());

        let result = drive(&mut session, &rx, &signal_state);
        session.close();

        if time_source::simulation_ended() {
            log_block_start!("Simulation complete");
        } else if time_source::is_simulated() {
            log_block_start!("Simulation interrupted");
        }
        log_block_start!("Closing miqat...");
        log_end!();

        result
    }
}

/// Handle session events until shutdown.
///
/// Returns an error only when re-arming fails, which ends the session.
pub fn drive(
    session: &mut Session,
    events: &Receiver<SessionEvent>,
    signal_state: &SignalState,
) -> Result<()> {
    let poll = Duration::from_millis(RUNNER_POLL_INTERVAL_MS);

    while signal_state.is_running() && !time_source::simulation_ended() {
        match events.recv_timeout(poll) {
            Ok(SessionEvent::Arrived(prayer)) => {
                log_debug!("{prayer} arrived, selecting the next prayer");
                session.rearm()?;
            }
            Ok(SessionEvent::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    Ok(())
}
