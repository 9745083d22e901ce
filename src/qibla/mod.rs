//! Qibla direction.
//!
//! The bearing is the initial great-circle bearing (forward azimuth) from the
//! observer to the Kaaba on a spherical Earth. At the poles every direction is
//! "south"/"north" and the result is whatever `atan2` makes of the degenerate
//! inputs; it is not special-cased.

pub mod orientation;

pub use orientation::{HeadingSource, NoHeading, OrientationCorrector, ReaderHeading};

use crate::common::constants::{KAABA_LATITUDE, KAABA_LONGITUDE};
use crate::common::utils::normalize_degrees;

/// Initial bearing in degrees `[0, 360)`, clockwise from true north, from the
/// observer to the Kaaba.
pub fn bearing(observer_lat: f64, observer_lon: f64) -> f64 {
    initial_bearing(observer_lat, observer_lon, KAABA_LATITUDE, KAABA_LONGITUDE)
}

/// Forward azimuth from `(from_lat, from_lon)` towards `(to_lat, to_lon)`.
///
/// Operand roles matter: swapping origin and destination gives the bearing
/// of the return leg, which is not the reverse direction on a sphere.
pub fn initial_bearing(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64) -> f64 {
    let phi1 = from_lat.to_radians();
    let phi2 = to_lat.to_radians();
    let delta_lambda = (to_lon - from_lon).to_radians();

    let x = phi2.cos() * delta_lambda.sin();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    normalize_degrees(x.atan2(y).to_degrees())
}

/// Pointer angle relative to the device: `(static − heading + 360) mod 360`.
pub fn display_bearing(static_bearing: f64, heading: f64) -> f64 {
    normalize_degrees(static_bearing - normalize_degrees(heading) + 360.0)
}
