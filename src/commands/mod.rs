//! One-shot CLI commands.
//!
//! `next` and `qibla` print a single answer and exit; `simulate` prepares an
//! accelerated clock and hands over to the live screen.

pub mod next;
pub mod qibla;
pub mod simulate;

use crate::error::EngineError;

/// Show an engine failure the way the live screen does, then wrap it.
pub(crate) fn report(error: EngineError) -> anyhow::Error {
    log_debug!("{error}");
    log_error_exit!("{}", error.user_message());
    anyhow::Error::new(error)
}
