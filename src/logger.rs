//! Structured logging system with visual formatting.
//!
//! Every line miqat prints goes through these macros so that the schedule,
//! the countdown and any errors share one box-drawing layout. Output goes to
//! stdout, or to a file when `--log` is given. Logging can be switched off at
//! runtime, which tests use to keep their output clean.
//!
//! The session countdown is the one exception to line-oriented output: it
//! rewrites a single terminal line in place through [`write_live`].

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// `log_debug!` output is only written with --debug
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Zone of the prayer location, used for simulation timestamps
static LOCATION_TIMEZONE: OnceLock<chrono_tz::Tz> = OnceLock::new();

// Set while a live line is on screen and must be cleared before the next log line
static LIVE_LINE_ACTIVE: AtomicBool = AtomicBool::new(false);

// Channel for routing output to file when --log is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Logger state and switches.
///
/// Layout used across miqat:
///
/// ```text
/// ┏ miqat v0.3.0 ━━╸        log_version!
/// ┃                         log_block_start! adds this spacer...
/// ┣ Prayer times             ...and this header
/// ┃   Fajr     05:00         log_indented! for rows under a header
/// ┣ Next: Isha at 19:20      log_decorated! continues the block
/// ┃
/// [WARNING] ...              log_warning!/log_error!/log_info!, after a log_pipe!
/// ╹                          log_end!
/// ```
///
/// `log_debug!` lines only appear with `--debug`.
pub struct Log;

impl Log {
    /// Turn all output on or off. Tests switch it off.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Show or hide `log_debug!` lines.
    pub fn set_debug_enabled(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug_enabled() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Record the prayer location's zone for simulation timestamps.
    /// Only the first call takes effect.
    pub fn set_location_timezone(tz: chrono_tz::Tz) {
        let _ = LOCATION_TIMEZONE.set(tz);
    }

    fn location_timezone() -> Option<chrono_tz::Tz> {
        LOCATION_TIMEZONE.get().copied()
    }

    /// True when output is being written to a log file instead of stdout.
    pub fn is_logging_to_file() -> bool {
        matches!(LOG_CHANNEL.get(), Some(Some(_)))
    }

    /// Start file logging to the specified path.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    // # Helper Functions

    /// Timestamp prefix shown while simulating.
    ///
    /// With a location zone known and different from the machine's, shows
    /// `[HH:MM:SSP] [HH:MM:SSL]` (prayer location, local). Otherwise
    /// `[HH:MM:SS]`. Empty outside simulation. Public for macro access.
    pub fn get_timestamp_prefix() -> String {
        // Checked without initializing the time source
        if !(crate::time_source::is_initialized() && crate::time_source::is_simulated()) {
            return String::new();
        }

        let local_now = crate::time_source::now();
        let local_str = local_now.format("%H:%M:%S").to_string();

        match Self::location_timezone() {
            Some(tz) => {
                let location_str = local_now.with_timezone(&tz).format("%H:%M:%S").to_string();
                if location_str != local_str {
                    format!("[{location_str}P] [{local_str}L] ")
                } else {
                    format!("[{local_str}] ")
                }
            }
            None => format!("[{local_str}] "),
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        // LOG_CHANNEL stays set; the process exits right after
    }
}

/// Remove `ESC [ ... m` color sequences so log files stay plain text.
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.by_ref().find(|&c| c == 'm');
            continue;
        }
        result.push(ch);
    }

    result
}

/// Route one formatted line to the log file or stdout.
pub fn write_output(text: &str) {
    clear_live_line();
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let clean_text = strip_ansi_codes(text);
        let _ = tx.send(LogMessage::Formatted(clean_text));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Overwrite the current terminal line with `text`.
///
/// Returns false without printing when logging is disabled or output goes to
/// a file, where in-place rewriting makes no sense.
pub fn write_live(text: &str) -> bool {
    if !Log::is_enabled() || Log::is_logging_to_file() {
        return false;
    }
    print!("\r\x1B[K{}{text}", Log::get_timestamp_prefix());
    let _ = std::io::stdout().flush();
    LIVE_LINE_ACTIVE.store(true, Ordering::SeqCst);
    true
}

/// Erase the live line, if one is showing.
pub fn clear_live_line() {
    if LIVE_LINE_ACTIVE.swap(false, Ordering::SeqCst) {
        print!("\r\x1B[K");
        let _ = std::io::stdout().flush();
    }
}

/// Line layouts produced by the logging macros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Decorated,
    Indented,
    Pipe,
    BlockStart,
    Version,
    End,
    Warning,
    Error,
    ErrorExit,
    Info,
    Debug,
}

/// Render one message in `style`, without the timestamp prefix.
pub fn format_line(style: LineStyle, prefix: &str, message: &str) -> String {
    match style {
        LineStyle::Decorated => format!("{prefix}┣ {message}\n"),
        LineStyle::Indented => format!("{prefix}┃   {message}\n"),
        LineStyle::Pipe => format!("{prefix}┃\n"),
        LineStyle::BlockStart => format!("{prefix}┃\n{prefix}┣ {message}\n"),
        LineStyle::Version => format!("{prefix}┏ miqat v{message} ━━╸\n"),
        LineStyle::End => format!("{prefix}╹\n"),
        LineStyle::Warning => format!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n"),
        LineStyle::Error => format!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n"),
        LineStyle::ErrorExit => {
            format!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n")
        }
        LineStyle::Info => format!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n"),
        LineStyle::Debug => format!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n"),
    }
}

/// Emit one line if logging is enabled. Used by the macros below.
pub fn emit(style: LineStyle, message: &str) {
    if style == LineStyle::Debug && !Log::is_debug_enabled() {
        return;
    }
    if Log::is_enabled() {
        let prefix = Log::get_timestamp_prefix();
        write_output(&format_line(style, &prefix, message));
    }
}

// # Logging Macros

#[doc(hidden)]
#[macro_export]
macro_rules! __log_styled {
    ($style:ident, $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($crate::logger::LineStyle::$style, &format!($fmt $($arg)*))
    };
    ($style:ident, $expr:expr) => {
        $crate::logger::emit($crate::logger::LineStyle::$style, &($expr).to_string())
    };
}

/// Log a decorated message, typically as part of an existing block or for standalone emphasis.
#[macro_export]
macro_rules! log_decorated {
    ($($t:tt)*) => { $crate::__log_styled!(Decorated, $($t)*) };
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($($t:tt)*) => { $crate::__log_styled!(Indented, $($t)*) };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit($crate::logger::LineStyle::Pipe, "")
    };
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($t:tt)*) => { $crate::__log_styled!(BlockStart, $($t)*) };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit($crate::logger::LineStyle::Version, env!("CARGO_PKG_VERSION"))
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit($crate::logger::LineStyle::End, "")
    };
}

/// Log a warning message with pipe prefix and yellow-colored text.
#[macro_export]
macro_rules! log_warning {
    ($($t:tt)*) => { $crate::__log_styled!(Warning, $($t)*) };
}

/// Log an error message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_error {
    ($($t:tt)*) => { $crate::__log_styled!(Error, $($t)*) };
}

/// Log an error that ends the output, closing the box with a corner.
#[macro_export]
macro_rules! log_error_exit {
    ($($t:tt)*) => { $crate::__log_styled!(ErrorExit, $($t)*) };
}

/// Log an informational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_info {
    ($($t:tt)*) => { $crate::__log_styled!(Info, $($t)*) };
}

/// Log a debug message with pipe prefix and green-colored text. Shown only with `--debug`.
#[macro_export]
macro_rules! log_debug {
    ($($t:tt)*) => { $crate::__log_styled!(Debug, $($t)*) };
}
