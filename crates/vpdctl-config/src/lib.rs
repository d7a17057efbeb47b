//! Configuration for vpdctl.
//!
//! TOML profiles, session cookie resolution (env + keyring + plaintext),
//! and translation to `vpdctl_core::DashboardConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vpdctl_core::{DEFAULT_BACKEND, DashboardConfig, OptimizeEndpoint, TlsVerification};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "VPDCTL_CONFIG";

/// Session cookie fallback when the profile names no variable of its own.
pub const SESSION_ENV: &str = "VPDCTL_SESSION";

const KEYRING_SERVICE: &str = "vpdctl";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend origin (e.g., "https://vpd.pixeltronic.dev").
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Which optimizer path the backend serves.
    pub optimize_endpoint: Option<OptimizeEndpoint>,

    /// Session cookie, `name=value` (plaintext; prefer keyring or env var).
    pub session_cookie: Option<String>,

    /// Environment variable name containing the session cookie.
    pub session_cookie_env: Option<String>,
}

impl Profile {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            timeout: None,
            insecure: None,
            ca_cert: None,
            optimize_endpoint: None,
            session_cookie: None,
            session_cookie_env: None,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new(default_backend())
    }
}

fn default_backend() -> String {
    DEFAULT_BACKEND.into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `VPDCTL_CONFIG`, else the platform
/// config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "pixeltronic", "vpdctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("vpdctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file is not an error.
///
/// Env keys nest with `__`: `VPDCTL_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("VPDCTL_")
                .ignore(&["config", "session"])
                .split("__"),
        );

    Ok(figment.extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Session cookie ──────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/session"))
}

/// Resolve the session cookie. The backend accepts anonymous requests, so
/// an absent cookie is `None`, not an error.
///
/// Order: the profile's `session_cookie_env` variable, `VPDCTL_SESSION`,
/// system keyring, plaintext in the profile.
pub fn resolve_session_cookie(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    if let Some(val) = profile
        .session_cookie_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Some(SecretString::from(val));
    }

    if let Ok(val) = std::env::var(SESSION_ENV) {
        return Some(SecretString::from(val));
    }

    if let Ok(secret) = keyring_entry(profile_name).and_then(|entry| entry.get_password()) {
        return Some(SecretString::from(secret));
    }

    profile
        .session_cookie
        .as_ref()
        .map(|cookie| SecretString::from(cookie.clone()))
}

/// Store a session cookie in the system keyring for `profile_name`.
pub fn store_session_cookie(profile_name: &str, cookie: &str) -> Result<(), ConfigError> {
    let cookie = cookie.trim();
    if !cookie.contains('=') {
        return Err(ConfigError::Validation {
            field: "session cookie".into(),
            reason: "expected name=value".into(),
        });
    }
    keyring_entry(profile_name)?.set_password(cookie)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse and validate a backend origin.
pub fn parse_backend(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "backend".into(),
            reason: format!("expected an http or https URL, got '{}'", url.scheme()),
        });
    }
    Ok(url)
}

/// Build a `DashboardConfig` from a profile, without CLI overrides.
/// Settings the profile leaves unset come from `defaults`.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let backend = parse_backend(&profile.backend)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(DashboardConfig {
        backend,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        optimize_endpoint: profile.optimize_endpoint.unwrap_or_default(),
        session_cookie: resolve_session_cookie(profile, profile_name),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "tent"

[defaults]
output = "json"

[profiles.tent]
backend = "http://grow.local:5000"
timeout = 5
optimize_endpoint = "adjust_conditions"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.active_profile_name(None), "tent");
        assert_eq!(cfg.active_profile_name(Some("other")), "other");
        assert_eq!(cfg.defaults.output, "json");

        let tent = &cfg.profiles["tent"];
        assert_eq!(tent.backend, "http://grow.local:5000");
        assert_eq!(tent.timeout, Some(5));
        assert_eq!(
            tent.optimize_endpoint,
            Some(OptimizeEndpoint::AdjustConditions)
        );
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles
            .insert("default".into(), Profile::new("https://vpd.example"));
        save_config_to(&cfg, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn profile_translation() {
        let mut profile = Profile::new("http://grow.local:5000/");
        profile.timeout = Some(7);
        profile.ca_cert = Some(PathBuf::from("/etc/grow-ca.pem"));

        let cfg = profile_to_dashboard_config(&profile, "tent", &Defaults::default()).unwrap();
        assert_eq!(cfg.backend.as_str(), "http://grow.local:5000/");
        assert_eq!(cfg.timeout, Duration::from_secs(7));
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/grow-ca.pem"))
        );
        assert_eq!(cfg.optimize_endpoint, OptimizeEndpoint::OptimizeControl);

        profile.insecure = Some(true);
        let cfg = profile_to_dashboard_config(&profile, "tent", &Defaults::default()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn profile_without_timeout_uses_configured_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[defaults]
timeout = 4

[profiles.tent]
backend = "http://grow.local:5000"

[profiles.shed]
backend = "http://shed.local:5000"
timeout = 12
"#,
        )
        .unwrap();
        let cfg = load_config_from(&path).unwrap();

        let tent =
            profile_to_dashboard_config(&cfg.profiles["tent"], "tent", &cfg.defaults).unwrap();
        assert_eq!(tent.timeout, Duration::from_secs(4));

        let shed =
            profile_to_dashboard_config(&cfg.profiles["shed"], "shed", &cfg.defaults).unwrap();
        assert_eq!(shed.timeout, Duration::from_secs(12));
    }

    #[test]
    fn rejects_bad_backends() {
        assert!(matches!(
            parse_backend("not a url"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            parse_backend("ftp://grow.local"),
            Err(ConfigError::Validation { .. })
        ));
    }

    #[test]
    fn session_cookie_must_look_like_a_cookie() {
        assert!(matches!(
            store_session_cookie("tent", "justavalue"),
            Err(ConfigError::Validation { .. })
        ));
    }
}
