//! Config file to running app

use std::fs;
use std::time::Duration;

use signup_config::SignupConfig;
use signup_engine::{App, Settings, UiOptions};

#[test]
fn config_file_drives_endpoints_and_ui_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[app]
tui = "inline"
ascii_only = true
reduced_motion = true

[endpoints]
postal_lookup_base = "http://127.0.0.1:8080"
registration_url = "http://127.0.0.1:8080/register"
request_timeout_secs = 5
"#,
    )
    .unwrap();

    let config = SignupConfig::load_from(&path).unwrap();
    let settings = Settings::from_config(config.as_ref());
    assert_eq!(settings.request_timeout, Duration::from_secs(5));

    let app = App::new(&settings).unwrap();
    assert_eq!(
        app.ui_options(),
        UiOptions {
            ascii_only: true,
            high_contrast: false,
            reduced_motion: true,
        }
    );
}

#[test]
fn missing_config_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = SignupConfig::load_from(&dir.path().join("absent.toml")).unwrap();
    assert!(config.is_none());
    assert!(App::new(&Settings::from_config(None)).is_ok());
}

#[test]
fn non_http_endpoint_is_rejected() {
    let settings = Settings {
        registration_url: "ftp://example.com/register".to_string(),
        ..Settings::default()
    };
    assert!(App::new(&settings).is_err());
}
