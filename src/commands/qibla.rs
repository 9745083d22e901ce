//! `miqat qibla`: print the static Qibla bearing for the configured location.

use anyhow::Result;

use crate::args::SessionOptions;
use crate::common::utils::compass_point;
use crate::config::Config;
use crate::geo::{ConfiguredLocation, GeoPosition, LocationSource};
use crate::qibla;

/// Locate once and compute the bearing from true north.
pub fn locate_and_bear(location: &dyn LocationSource) -> Result<(GeoPosition, f64)> {
    let position = location.locate().map_err(|e| super::report(e.into()))?;
    let bearing = qibla::bearing(position.latitude(), position.longitude());
    Ok((position, bearing))
}

pub fn handle_qibla_command(options: &SessionOptions) -> Result<()> {
    log_version!();

    let config = Config::load()?;
    let location =
        ConfiguredLocation::from_config(&config, options.latitude, options.longitude);
    let (position, bearing) = locate_and_bear(&location)?;

    log_block_start!(
        "Qibla direction: {bearing:.1}° ({}) from true north",
        compass_point(bearing)
    );
    log_indented!("Location: {position}");
    log_end!();
    Ok(())
}
