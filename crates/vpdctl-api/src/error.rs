use thiserror::Error;

/// Top-level error type for the `vpdctl-api` crate.
///
/// Every endpoint method returns `Result<T, Error>`; there are no sentinel
/// bodies. `vpdctl-core` maps these into operation-aware diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// The backend answered with a non-2xx status. `body` falls back to the
    /// canonical reason phrase when the response had none.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The body decoded, but not into the shape the endpoint promises
    /// (e.g. an array where an object was expected).
    #[error("Unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The request was rejected locally before anything was sent.
    #[error("Invalid request payload: {0}")]
    InvalidPayload(String),
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The client itself never retries; callers decide.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// HTTP status code, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
