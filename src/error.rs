//! Error taxonomy for a prayer-time session.
//!
//! Every variant is terminal for the session that produced it: nothing retries
//! automatically and no partial state is shown. Each maps to one user-facing
//! message class through [`EngineError::user_message`].

use thiserror::Error;

/// Failure reported by a geolocation source for a one-shot fix request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("permission to read the location was denied")]
    PermissionDenied,
    #[error("position is unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("unknown geolocation failure")]
    Unknown,
}

/// Errors surfaced by the engine to whoever hosts the session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("location access denied")]
    LocationDenied,

    #[error("location unavailable")]
    LocationUnavailable,

    #[error("location request timed out")]
    LocationTimeout,

    #[error("unknown location error")]
    LocationUnknown,

    #[error("timing provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("malformed timing response: {0}")]
    MalformedResponse(String),
}

impl EngineError {
    /// The message shown to the user in place of the prayer schedule.
    pub fn user_message(&self) -> &'static str {
        match self {
            EngineError::LocationDenied => {
                "Location access denied. Please enable location access for accurate prayer times."
            }
            EngineError::LocationUnavailable => "Location information is unavailable.",
            EngineError::LocationTimeout => "The request to get your location timed out.",
            EngineError::LocationUnknown => "An unknown error occurred.",
            EngineError::ProviderUnavailable(_) | EngineError::MalformedResponse(_) => {
                "Error fetching prayer times. Please try again later."
            }
        }
    }
}

impl From<GeolocationError> for EngineError {
    fn from(err: GeolocationError) -> Self {
        match err {
            GeolocationError::PermissionDenied => EngineError::LocationDenied,
            GeolocationError::PositionUnavailable => EngineError::LocationUnavailable,
            GeolocationError::Timeout => EngineError::LocationTimeout,
            GeolocationError::Unknown => EngineError::LocationUnknown,
        }
    }
}
