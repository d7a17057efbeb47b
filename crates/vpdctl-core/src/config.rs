// ── Runtime connection configuration ──
//
// These types describe *how* to reach the backend. They carry the optional
// session cookie and connection tuning, but never touch disk. The CLI
// builds a `DashboardConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use vpdctl_api::OptimizeEndpoint;

/// Backend origin used when no profile names one.
pub const DEFAULT_BACKEND: &str = "https://vpd.pixeltronic.dev";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default: the backend is a public origin.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

/// Configuration for talking to one backend.
///
/// Built by the CLI, passed to `Dashboard` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend origin (e.g., `https://vpd.pixeltronic.dev`).
    pub backend: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Which optimizer path the backend serves.
    pub optimize_endpoint: OptimizeEndpoint,
    /// Session cookie (`name=value`) preloaded into the cookie jar.
    pub session_cookie: Option<SecretString>,
}

impl DashboardConfig {
    /// Defaults for everything except the origin.
    pub fn new(backend: Url) -> Self {
        Self {
            backend,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            optimize_endpoint: OptimizeEndpoint::default(),
            session_cookie: None,
        }
    }
}
