//! Configuration loading for Signup.
//!
//! The config file lives at `~/.signup/config.toml`. Every section is
//! optional; missing values fall back to the defaults below, and a handful of
//! environment variables override the file.
//!
//! ```toml
//! [app]
//! tui = "inline"
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//!
//! [endpoints]
//! postal_lookup_base = "https://brasilapi.com.br"
//! registration_url = "https://apis.codante.io/api/register-user/register"
//! request_timeout_secs = 60
//! ```

use std::{env, fs, io, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use toml::de::Error as TomlError;

pub const DEFAULT_POSTAL_LOOKUP_BASE: &str = "https://brasilapi.com.br";
pub const DEFAULT_REGISTRATION_URL: &str = "https://apis.codante.io/api/register-user/register";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

pub const POSTAL_BASE_ENV: &str = "SIGNUP_POSTAL_BASE_URL";
pub const REGISTRATION_URL_ENV: &str = "SIGNUP_REGISTRATION_URL";

#[derive(Debug, Default, Deserialize)]
pub struct SignupConfig {
    pub app: Option<AppConfig>,
    pub endpoints: Option<EndpointsConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// "full" or "inline".
    pub tui: Option<String>,
    /// Use ASCII-only glyphs for the spinner and markers.
    #[serde(default)]
    pub ascii_only: bool,
    #[serde(default)]
    pub high_contrast: bool,
    /// Show a static spinner instead of an animated one.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndpointsConfig {
    pub postal_lookup_base: Option<String>,
    pub registration_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: TomlError,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl SignupConfig {
    /// Load the config from its default location. `Ok(None)` when absent.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map(Some).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".signup").join("config.toml"))
}

/// Fully resolved endpoint and UI settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub postal_lookup_base: String,
    pub registration_url: String,
    pub request_timeout: Duration,
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            postal_lookup_base: DEFAULT_POSTAL_LOOKUP_BASE.to_string(),
            registration_url: DEFAULT_REGISTRATION_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            ascii_only: false,
            high_contrast: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Resolve settings from an optional config file and the process environment.
    #[must_use]
    pub fn resolve(config: Option<&SignupConfig>) -> Self {
        let mut settings = Self::from_config(config);
        settings.apply_env_overrides(|key| env::var(key).ok());
        settings
    }

    #[must_use]
    pub fn from_config(config: Option<&SignupConfig>) -> Self {
        let mut settings = Self::default();
        let Some(config) = config else {
            return settings;
        };

        if let Some(app) = config.app.as_ref() {
            settings.ascii_only = app.ascii_only;
            settings.high_contrast = app.high_contrast;
            settings.reduced_motion = app.reduced_motion;
        }

        if let Some(endpoints) = config.endpoints.as_ref() {
            if let Some(base) = non_empty(endpoints.postal_lookup_base.as_deref()) {
                settings.postal_lookup_base = base;
            }
            if let Some(url) = non_empty(endpoints.registration_url.as_deref()) {
                settings.registration_url = url;
            }
            match endpoints.request_timeout_secs {
                Some(0) => tracing::warn!("Ignoring request_timeout_secs = 0"),
                Some(secs) => settings.request_timeout = Duration::from_secs(secs),
                None => {}
            }
        }

        settings
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = non_empty(lookup(POSTAL_BASE_ENV).as_deref()) {
            self.postal_lookup_base = base;
        }
        if let Some(url) = non_empty(lookup(REGISTRATION_URL_ENV).as_deref()) {
            self.registration_url = url;
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    let expanded = expand_env_vars(raw?);
    let trimmed = expanded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Replace `${VAR}` references with the variable's value (empty when unset).
/// An unclosed `${` is kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;

    fn parse(raw: &str) -> SignupConfig {
        toml::from_str(raw).expect("test config parses")
    }

    #[test]
    fn defaults_without_config() {
        let settings = Settings::from_config(None);
        assert_eq!(settings.postal_lookup_base, DEFAULT_POSTAL_LOOKUP_BASE);
        assert_eq!(settings.registration_url, DEFAULT_REGISTRATION_URL);
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn endpoints_section_overrides_defaults() {
        let config = parse(
            r#"
            [endpoints]
            postal_lookup_base = "http://localhost:8080"
            registration_url = "http://localhost:9090/register"
            request_timeout_secs = 5
            "#,
        );
        let settings = Settings::from_config(Some(&config));
        assert_eq!(settings.postal_lookup_base, "http://localhost:8080");
        assert_eq!(settings.registration_url, "http://localhost:9090/register");
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_timeout_and_blank_urls_are_ignored() {
        let config = parse(
            r#"
            [endpoints]
            postal_lookup_base = "   "
            request_timeout_secs = 0
            "#,
        );
        let settings = Settings::from_config(Some(&config));
        assert_eq!(settings.postal_lookup_base, DEFAULT_POSTAL_LOOKUP_BASE);
        assert_eq!(settings.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn app_section_sets_ui_flags() {
        let config = parse(
            r#"
            [app]
            tui = "inline"
            high_contrast = true
            reduced_motion = true
            "#,
        );
        let settings = Settings::from_config(Some(&config));
        assert!(settings.high_contrast);
        assert!(settings.reduced_motion);
        assert!(!settings.ascii_only);
        assert_eq!(
            config.app.and_then(|app| app.tui).as_deref(),
            Some("inline")
        );
    }

    #[test]
    fn env_overrides_win_over_file() {
        let config = parse(
            r#"
            [endpoints]
            registration_url = "http://file/register"
            "#,
        );
        let env: HashMap<&str, &str> = [
            (POSTAL_BASE_ENV, "http://env-postal"),
            (REGISTRATION_URL_ENV, "http://env/register"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::from_config(Some(&config));
        settings.apply_env_overrides(|key| env.get(key).map(ToString::to_string));
        assert_eq!(settings.postal_lookup_base, "http://env-postal");
        assert_eq!(settings.registration_url, "http://env/register");
    }

    #[test]
    fn load_from_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = SignupConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[endpoints\nbroken").unwrap();
        let err = SignupConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn load_from_reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[endpoints]\nrequest_timeout_secs = 3\n").unwrap();
        let config = SignupConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(
            config.endpoints.and_then(|e| e.request_timeout_secs),
            Some(3)
        );
    }

    #[test]
    fn expand_env_vars_no_vars() {
        assert_eq!(expand_env_vars("hello world"), "hello world");
    }

    #[test]
    fn expand_env_vars_single_var() {
        unsafe {
            env::set_var("SIGNUP_TEST_EXPAND_SINGLE", "replaced");
        }
        assert_eq!(
            expand_env_vars("prefix ${SIGNUP_TEST_EXPAND_SINGLE} suffix"),
            "prefix replaced suffix"
        );
        unsafe {
            env::remove_var("SIGNUP_TEST_EXPAND_SINGLE");
        }
    }

    #[test]
    fn expand_env_vars_missing_var_becomes_empty() {
        assert_eq!(
            expand_env_vars("a ${SIGNUP_TEST_EXPAND_MISSING} b"),
            "a  b"
        );
    }

    #[test]
    fn expand_env_vars_unclosed_brace_preserved() {
        assert_eq!(expand_env_vars("test ${UNCLOSED"), "test ${UNCLOSED");
    }

    #[test]
    fn expand_env_vars_empty_name_dropped() {
        assert_eq!(expand_env_vars("x ${} y"), "x  y");
    }
}
