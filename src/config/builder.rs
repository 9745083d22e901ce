//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::common::constants::*;

/// Write a commented default `miqat.toml` at `path`.
///
/// Coordinates are left commented out: there is no sensible default
/// location, and a session without one reports the position as unavailable.
pub fn create_default_config(path: &PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = ConfigBuilder::new()
        .add_section("Location")
        .add_setting(
            "location_enabled",
            &DEFAULT_LOCATION_ENABLED.to_string(),
            "Allow reading the configured position (false = denied)",
        )
        .add_commented_setting(
            "latitude",
            &format!("{KAABA_LATITUDE:.6}"),
            "Geographic latitude (-90 to 90)",
        )
        .add_commented_setting(
            "longitude",
            &format!("{KAABA_LONGITUDE:.6}"),
            "Geographic longitude (-180 to 180)",
        )
        .add_section("Prayer times")
        .add_setting(
            "method",
            &DEFAULT_METHOD.to_string(),
            &format!("Calculation method passed to the provider (0-{MAXIMUM_METHOD})"),
        )
        .add_setting(
            "timings_url",
            &format!("\"{DEFAULT_TIMINGS_URL}\""),
            "Prayer timing service",
        )
        .add_setting(
            "request_timeout",
            &DEFAULT_REQUEST_TIMEOUT.to_string(),
            &format!(
                "HTTP timeout in seconds ({MINIMUM_REQUEST_TIMEOUT}-{MAXIMUM_REQUEST_TIMEOUT})"
            ),
        )
        .add_section("Display")
        .add_setting(
            "reverse_geocode",
            &DEFAULT_REVERSE_GEOCODE.to_string(),
            "Look up a place name for the coordinates",
        )
        .add_setting(
            "geocode_url",
            &format!("\"{DEFAULT_GEOCODE_URL}\""),
            "Reverse geocoding service",
        )
        .add_setting(
            "tick_interval_ms",
            &DEFAULT_TICK_INTERVAL_MS.to_string(),
            &format!(
                "Countdown refresh period ({MINIMUM_TICK_INTERVAL_MS}-{MAXIMUM_TICK_INTERVAL_MS})ms"
            ),
        )
        .add_setting(
            "heading_source",
            &format!("\"{DEFAULT_HEADING_SOURCE}\""),
            "Compass headings: \"none\", \"stdin\" or a path",
        )
        .build();

    fs::write(path, content)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    Ok(())
}

/// Assembles a TOML file with section headers and aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(Entry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A setting that is shown but disabled until the user uncomments it.
    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("#{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Setting { line, .. } => Some(line.len()),
                Entry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for (i, entry) in self.entries.into_iter().enumerate() {
            match entry {
                Entry::Section(title) => {
                    if i > 0 {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                Entry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}
