//! Device-relative Qibla pointer.
//!
//! The static bearing is computed once per session. Every heading sample from
//! the device re-expresses it relative to where the device points. Samples
//! are pushed, not polled: one sample, one recomputation, one display update.
//! No smoothing is applied.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::display_bearing;
use crate::timer::{TaskHandle, spawn_listener};

/// Combines the static Qibla bearing with live heading samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationCorrector {
    static_bearing: f64,
}

impl OrientationCorrector {
    pub fn new(static_bearing: f64) -> Self {
        Self { static_bearing }
    }

    pub fn static_bearing(&self) -> f64 {
        self.static_bearing
    }

    /// Pointer angle for one heading sample.
    pub fn correct(&self, heading: f64) -> f64 {
        display_bearing(self.static_bearing, heading)
    }

    /// Subscribe to `source`, forwarding each corrected angle to `on_display`.
    ///
    /// Returns `Ok(None)` when the source has no heading support; the caller
    /// then keeps showing the static bearing unrotated.
    pub fn attach<F>(
        &self,
        source: Box<dyn HeadingSource>,
        mut on_display: F,
    ) -> Result<Option<TaskHandle>>
    where
        F: FnMut(f64, f64) + Send + 'static,
    {
        let corrector = *self;
        source.subscribe(Box::new(move |heading| {
            on_display(heading, corrector.correct(heading));
        }))
    }
}

/// Callback receiving one heading sample in degrees.
pub type HeadingSink = Box<dyn FnMut(f64) + Send>;

/// Platform event source emitting device headings in degrees.
pub trait HeadingSource: Send {
    /// Start delivering samples to `sink`. `Ok(None)` means unsupported.
    fn subscribe(self: Box<Self>, sink: HeadingSink) -> Result<Option<TaskHandle>>;
}

/// A platform without a compass.
pub struct NoHeading;

impl HeadingSource for NoHeading {
    fn subscribe(self: Box<Self>, _sink: HeadingSink) -> Result<Option<TaskHandle>> {
        Ok(None)
    }
}

/// Headings read one per line from a text stream (stdin, a named pipe fed
/// by a sensor bridge, or a recorded file).
pub struct ReaderHeading {
    label: String,
    reader: Box<dyn BufRead + Send>,
}

impl ReaderHeading {
    pub fn new(label: &str, reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            label: label.to_string(),
            reader,
        }
    }

    pub fn stdin() -> Self {
        Self::new("stdin", Box::new(BufReader::new(std::io::stdin())))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open heading source {}", path.display()))?;
        Ok(Self::new(
            &path.display().to_string(),
            Box::new(BufReader::new(file)),
        ))
    }
}

/// Parse one heading line. Blank lines and non-numeric input yield `None`.
pub fn parse_heading(line: &str) -> Option<f64> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|h| h.is_finite())
}

impl HeadingSource for ReaderHeading {
    fn subscribe(self: Box<Self>, mut sink: HeadingSink) -> Result<Option<TaskHandle>> {
        let ReaderHeading { label, reader } = *self;
        let name = format!("heading-{label}");

        let handle = spawn_listener(&name, move |gate| {
            for line in reader.lines() {
                let Ok(line) = line else {
                    break;
                };
                if !gate.is_open() {
                    return;
                }
                let Some(heading) = parse_heading(&line) else {
                    if !line.trim().is_empty() {
                        log_debug!("Ignoring heading sample from {label}: {line:?}");
                    }
                    continue;
                };
                if gate.run(|| sink(heading)).is_none() {
                    return;
                }
            }
        })?;

        Ok(Some(handle))
    }
}

/// Build the heading source named in the configuration.
///
/// `"none"` disables the compass, `"stdin"` reads standard input, anything
/// else is treated as a path.
pub fn heading_source_from_setting(setting: &str) -> Result<Box<dyn HeadingSource>> {
    match setting {
        "none" | "" => Ok(Box::new(NoHeading)),
        "stdin" => Ok(Box::new(ReaderHeading::stdin())),
        path => Ok(Box::new(ReaderHeading::open(Path::new(path))?)),
    }
}
