//! Application-wide constants.
//!
//! Defaults and validation limits for the configuration file live here so that
//! the loader, the validator and the default-config builder agree on them.

// # Qibla reference point

/// Latitude of the Kaaba in degrees (spherical approximation).
pub const KAABA_LATITUDE: f64 = 21.4253;
/// Longitude of the Kaaba in degrees.
pub const KAABA_LONGITUDE: f64 = 39.8262;

// # Timing provider

/// Calculation method passed through to the timing provider (2 = ISNA).
pub const DEFAULT_METHOD: u8 = 2;
pub const MAXIMUM_METHOD: u8 = 23;

pub const DEFAULT_TIMINGS_URL: &str = "https://api.aladhan.com/v1";
pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_REVERSE_GEOCODE: bool = true;

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 10;
pub const MINIMUM_REQUEST_TIMEOUT: u64 = 1;
pub const MAXIMUM_REQUEST_TIMEOUT: u64 = 120;

/// Nominatim rejects requests without an identifying agent.
pub const USER_AGENT: &str = concat!("miqat/", env!("CARGO_PKG_VERSION"));

/// Label used when reverse geocoding yields no city, town or village.
pub const UNKNOWN_LOCATION_LABEL: &str = "Unknown Location";

// # Countdown

/// Countdown re-evaluation period in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub const MINIMUM_TICK_INTERVAL_MS: u64 = 100;
pub const MAXIMUM_TICK_INTERVAL_MS: u64 = 60_000;

/// How often the runner wakes to check whether a simulation has ended.
pub const RUNNER_POLL_INTERVAL_MS: u64 = 100;

// # Location and heading

pub const DEFAULT_LOCATION_ENABLED: bool = true;
pub const DEFAULT_HEADING_SOURCE: &str = "none";

// # Simulation

/// Simulated seconds per real second when `--multiplier` is not given.
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 60.0;

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
