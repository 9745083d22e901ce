use super::validation::validate_config;
use super::*;
use crate::common::constants::test_constants::*;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn test_config() -> Config {
    Config {
        latitude: Some(TEST_LATITUDE),
        longitude: Some(TEST_LONGITUDE),
        location_enabled: Some(true),
        method: Some(TEST_METHOD),
        timings_url: Some(DEFAULT_TIMINGS_URL.to_string()),
        request_timeout: Some(TEST_REQUEST_TIMEOUT),
        reverse_geocode: Some(false),
        geocode_url: None,
        tick_interval_ms: Some(TEST_TICK_INTERVAL_MS),
        heading_source: Some("none".to_string()),
    }
}

/// Run `f` with `XDG_CONFIG_HOME` pointed at `dir`, restoring it afterwards.
fn with_config_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", dir);
    }

    let result = f();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
    result
}

#[test]
#[serial]
fn test_config_load_default_creation() {
    crate::logger::Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("miqat").join("miqat.toml");

    let result = with_config_home(temp_dir.path(), Config::load);

    let config = result.unwrap();
    assert!(config_path.exists());
    assert_eq!(config.latitude, None);
    assert_eq!(config.method(), DEFAULT_METHOD);
    assert!(config.location_enabled());
}

#[test]
#[serial]
fn test_default_config_parses_back() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("miqat.toml");
    create_default_config(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("#latitude = 21.425300"));
    assert!(content.contains("method = 2"));

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.heading_source(), "none");
    assert_eq!(config.tick_interval_ms, Some(DEFAULT_TICK_INTERVAL_MS));
}

#[test]
#[serial]
fn test_load_from_path_reads_fields() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("miqat.toml");
    fs::write(
        &path,
        r#"
latitude = -6.2088
longitude = 106.8456
method = 20
reverse_geocode = false
tick_interval_ms = 250
heading_source = "stdin"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.latitude, Some(-6.2088));
    assert_eq!(config.method(), 20);
    assert!(!config.reverse_geocode());
    assert_eq!(config.tick_interval(), std::time::Duration::from_millis(250));
    assert_eq!(config.heading_source(), "stdin");
    assert_eq!(config.timings_url(), DEFAULT_TIMINGS_URL);
}

#[test]
#[serial]
fn test_geo_toml_overrides_coordinates() {
    crate::logger::Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("miqat.toml");
    fs::write(&path, "latitude = 10.0\nlongitude = 10.0\n").unwrap();
    fs::write(
        temp_dir.path().join("geo.toml"),
        "latitude = 51.5074\nlongitude = -0.1278\n",
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.latitude, Some(51.5074));
    assert_eq!(config.longitude, Some(-0.1278));
}

#[test]
#[serial]
fn test_malformed_geo_toml_is_ignored() {
    crate::logger::Log::set_enabled(false);
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("miqat.toml");
    fs::write(&path, "latitude = 10.0\nlongitude = 20.0\n").unwrap();
    fs::write(temp_dir.path().join("geo.toml"), "latitude = [").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.latitude, Some(10.0));
}

#[test]
#[serial]
fn test_geo_toml_values_are_validated() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("miqat.toml");
    fs::write(&path, "method = 2\n").unwrap();
    fs::write(temp_dir.path().join("geo.toml"), "latitude = 95.0\n").unwrap();

    assert!(load_from_path(&path).is_err());
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("absent.toml");
    let err = load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("miqat.toml");
    fs::write(&path, "method = \"two\"\n").unwrap();
    assert!(load_from_path(&path).is_err());
}

#[test]
fn test_config_validation_basic() {
    assert!(validate_config(&test_config()).is_ok());
    assert!(validate_config(&Config::default()).is_ok());
}

#[test]
fn test_config_validation_coordinates() {
    let mut config = test_config();
    config.latitude = Some(90.5);
    assert!(validate_config(&config).is_err());

    let mut config = test_config();
    config.longitude = Some(-180.1);
    assert!(validate_config(&config).is_err());

    let mut config = test_config();
    config.latitude = Some(-90.0);
    config.longitude = Some(180.0);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_config_validation_ranges() {
    let mut config = test_config();
    config.method = Some(MAXIMUM_METHOD + 1);
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("method"));

    let mut config = test_config();
    config.request_timeout = Some(0);
    assert!(validate_config(&config).is_err());

    let mut config = test_config();
    config.tick_interval_ms = Some(MINIMUM_TICK_INTERVAL_MS - 1);
    assert!(validate_config(&config).is_err());

    let mut config = test_config();
    config.tick_interval_ms = Some(MAXIMUM_TICK_INTERVAL_MS);
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_config_validation_urls_and_heading() {
    let mut config = test_config();
    config.timings_url = Some("api.aladhan.com".to_string());
    assert!(validate_config(&config).is_err());

    let mut config = test_config();
    config.geocode_url = Some("ftp://example.org".to_string());
    assert!(validate_config(&config).is_err());

    let mut config = test_config();
    config.heading_source = Some("  ".to_string());
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_accessor_defaults() {
    let config = Config::default();
    assert_eq!(config.method(), DEFAULT_METHOD);
    assert_eq!(config.geocode_url(), DEFAULT_GEOCODE_URL);
    assert_eq!(config.request_timeout().as_secs(), DEFAULT_REQUEST_TIMEOUT);
    assert_eq!(config.heading_source(), DEFAULT_HEADING_SOURCE);
    assert!(config.reverse_geocode());
}
