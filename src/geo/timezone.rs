//! Timezone lookup from coordinates.
//!
//! Used when the timing provider does not report the zone its clock times are
//! expressed in. The finder carries a large embedded dataset, so it is built
//! once and shared.

use chrono_tz::Tz;
use once_cell::sync::Lazy;
use tzf_rs::DefaultFinder;

static FINDER: Lazy<DefaultFinder> = Lazy::new(DefaultFinder::new);

/// Determine the IANA timezone for a coordinate pair, falling back to UTC for
/// open ocean or names chrono-tz does not know.
pub fn determine_timezone_from_coordinates(latitude: f64, longitude: f64) -> Tz {
    let name = FINDER.get_tz_name(longitude, latitude);
    name.parse::<Tz>().unwrap_or(Tz::UTC)
}
