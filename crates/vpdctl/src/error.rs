//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use vpdctl_config::ConfigError;
use vpdctl_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const BACKEND: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("{summary}")]
    #[diagnostic(
        code(vpdctl::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Backend: {url}\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { summary: String, url: String },

    #[error("{summary}")]
    #[diagnostic(
        code(vpdctl::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { summary: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("{summary}")]
    #[diagnostic(code(vpdctl::not_found), help("{hint}"))]
    NotFound { summary: String, hint: String },

    #[error("{summary}")]
    #[diagnostic(code(vpdctl::rejected))]
    Rejected { summary: String },

    #[error("{summary}")]
    #[diagnostic(
        code(vpdctl::malformed_response),
        help("The backend answered with a shape vpdctl does not understand. Run with -vv for details.")
    )]
    MalformedResponse { summary: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vpdctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vpdctl::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vpdctl config init --backend <URL> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(vpdctl::config))]
    Config(#[from] ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(vpdctl::json), help("The payload must be a single JSON object."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } | Self::MalformedResponse { .. } => exit_code::BACKEND,
            Self::Validation { .. }
            | Self::Json(_)
            | Self::Config(ConfigError::Validation { .. }) => exit_code::USAGE,
            Self::Config(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let summary = err.to_string();
        match err {
            CoreError::Unreachable { url, .. } => Self::ConnectionFailed { summary, url },

            CoreError::Timeout { .. } => Self::Timeout { summary },

            CoreError::Rejected { status: 404, .. } => Self::NotFound {
                summary,
                hint: "The backend has no such route or device. Check the name and the \
                       backend version."
                    .into(),
            },

            CoreError::Rejected { .. } => Self::Rejected { summary },

            CoreError::MalformedResponse { .. } => Self::MalformedResponse { summary },

            CoreError::InvalidRequest { message, .. } => Self::Validation {
                field: "request".into(),
                reason: message,
            },

            CoreError::Config { message } => Self::Validation {
                field: "connection settings".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use vpdctl_core::Operation;

    use super::*;

    #[test]
    fn backend_errors_keep_the_operation_summary() {
        let core = CoreError::Rejected {
            operation: Operation::ToggleDevice,
            status: 500,
            message: "Internal Server Error".into(),
        };
        let cli = CliError::from(core);
        assert_eq!(cli.exit_code(), exit_code::BACKEND);
        assert!(cli.to_string().starts_with("Failed to toggle device"));
    }

    #[test]
    fn exit_codes_by_kind() {
        let unreachable = CliError::from(CoreError::Unreachable {
            operation: Operation::GetSensorData,
            url: "http://127.0.0.1:9/sensor_data".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);

        let timeout = CliError::from(CoreError::Timeout {
            operation: Operation::GetVpdTarget,
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let missing = CliError::from(CoreError::Rejected {
            operation: Operation::ToggleDevice,
            status: 404,
            message: "Not Found".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
    }
}
