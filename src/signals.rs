//! Signal handling for a running session.
//!
//! SIGINT, SIGTERM and SIGHUP are forwarded to the runner as
//! [`SessionEvent::Shutdown`]. The runner closes the session, which cancels
//! the countdown timer and the heading subscription before the process exits.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM},
    iterator::Signals,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use crate::common::constants::EXIT_FAILURE;
use crate::session::SessionEvent;

/// Signal handling state shared with the runner.
pub struct SignalState {
    /// Cleared once a shutdown signal has been received.
    pub running: Arc<AtomicBool>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Message logged when `signal` asks us to stop.
pub fn shutdown_message(signal: i32, debug_enabled: bool) -> &'static str {
    match signal {
        SIGINT if debug_enabled => "Received SIGINT (Ctrl+C), shutting down...",
        SIGINT => "Received interrupt signal, shutting down...",
        SIGTERM => "Received termination request, shutting down...",
        SIGHUP => "Terminal closed, shutting down...",
        _ => "Received shutdown signal",
    }
}

/// What the signal thread does after a signal has been handled.
#[derive(Debug, PartialEq, Eq)]
pub enum SignalOutcome {
    /// First shutdown request; the runner was told to stop.
    Shutdown,
    /// A shutdown was already underway and another signal arrived.
    Force,
}

/// Handle one shutdown signal. Only the first one reaches `events`.
pub fn handle_signal(
    sig: i32,
    running: &AtomicBool,
    events: &Sender<SessionEvent>,
    debug_enabled: bool,
) -> SignalOutcome {
    if !running.swap(false, Ordering::SeqCst) {
        return SignalOutcome::Force;
    }

    log_pipe!();
    log_info!("{}", shutdown_message(sig, debug_enabled));
    if let Err(e) = events.send(SessionEvent::Shutdown) {
        log_warning!("Failed to send shutdown message: {e}");
    }
    SignalOutcome::Shutdown
}

/// Register the shutdown signals and forward the first one to `events`.
///
/// The thread keeps listening for the life of the process. A second signal
/// while the session is still closing exits immediately.
pub fn setup_signal_handler(
    events: Sender<SessionEvent>,
    debug_enabled: bool,
) -> Result<SignalState> {
    let running = Arc::new(AtomicBool::new(true));
    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("failed to register signal handlers")?;

    let running_clone = Arc::clone(&running);
    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                if handle_signal(sig, &running_clone, &events, debug_enabled)
                    == SignalOutcome::Force
                {
                    log_pipe!();
                    log_error_exit!("Received another signal during shutdown, exiting now");
                    std::process::exit(EXIT_FAILURE);
                }
            }
        })
        .context("failed to spawn signal handler thread")?;

    Ok(SignalState { running })
}
