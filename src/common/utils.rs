//! Small helpers shared by the display and configuration code.

use std::path::Path;

/// Wrap an angle in degrees into `[0, 360)`.
///
/// `rem_euclid` can return exactly 360.0 for tiny negative inputs due to
/// rounding, so that case is folded back to zero.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Eight-point compass label for a bearing in degrees.
pub fn compass_point(degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = ((normalize_degrees(degrees) + 22.5) / 45.0) as usize % 8;
    POINTS[index]
}

/// Replace the home directory prefix with `~` so logs don't leak usernames.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }
    path.display().to_string()
}
