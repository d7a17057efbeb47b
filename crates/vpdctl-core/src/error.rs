// ── Core error types ──
//
// User-facing errors from vpdctl-core. Every backend failure carries the
// `Operation` that produced it, so callers can tell an unreachable
// backend from one that rejected the request without parsing strings.
// `CoreError::from_api` translates transport-layer errors.

use thiserror::Error;

use crate::operation::Operation;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("{}: cannot reach backend at {url}: {reason}", .operation.failure_message())]
    Unreachable {
        operation: Operation,
        url: String,
        reason: String,
    },

    #[error("{}: request timed out", .operation.failure_message())]
    Timeout { operation: Operation },

    // ── Backend errors ───────────────────────────────────────────────
    #[error("{}: backend returned HTTP {status}: {message}", .operation.failure_message())]
    Rejected {
        operation: Operation,
        status: u16,
        message: String,
    },

    #[error("{}: unexpected response: {message}", .operation.failure_message())]
    MalformedResponse {
        operation: Operation,
        message: String,
    },

    // ── Request errors ───────────────────────────────────────────────
    #[error("{}: invalid request: {message}", .operation.failure_message())]
    InvalidRequest {
        operation: Operation,
        message: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Map a transport-layer error raised while performing `operation`.
    pub fn from_api(operation: Operation, err: vpdctl_api::Error) -> Self {
        use vpdctl_api::Error as Api;

        match err {
            Api::Transport(ref e) if e.is_timeout() => Self::Timeout { operation },
            Api::Transport(ref e) if e.is_decode() => Self::MalformedResponse {
                operation,
                message: e.to_string(),
            },
            Api::Transport(e) => Self::Unreachable {
                operation,
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            Api::Status { status, body } => Self::Rejected {
                operation,
                status,
                message: rejection_message(&body),
            },
            Api::Deserialization { message, body: _ } | Api::UnexpectedShape(message) => {
                Self::MalformedResponse { operation, message }
            }
            Api::InvalidPayload(message) => Self::InvalidRequest { operation, message },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(message) => Self::Config {
                message: format!("TLS error: {message}"),
            },
        }
    }

    /// The operation that failed, if this error came from a backend call.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Unreachable { operation, .. }
            | Self::Timeout { operation }
            | Self::Rejected { operation, .. }
            | Self::MalformedResponse { operation, .. }
            | Self::InvalidRequest { operation, .. } => Some(*operation),
            Self::Config { .. } => None,
        }
    }

    /// Short summary suitable for a status line ("Failed to toggle device").
    pub fn failure_message(&self) -> &'static str {
        self.operation()
            .map_or("Invalid configuration", Operation::failure_message)
    }
}

/// Backend message, trimmed and capped at 200 characters.
fn rejection_message(body: &str) -> String {
    const MAX_LEN: usize = 200;

    let body = body.trim();
    match body.char_indices().nth(MAX_LEN) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rejected_toggle_reads_like_the_dashboard() {
        let err = CoreError::from_api(
            Operation::ToggleDevice,
            vpdctl_api::Error::Status {
                status: 500,
                body: "Internal Server Error".into(),
            },
        );

        assert_eq!(err.failure_message(), "Failed to toggle device");
        assert_eq!(
            err.to_string(),
            "Failed to toggle device: backend returned HTTP 500: Internal Server Error"
        );
    }

    #[test]
    fn shape_errors_become_malformed_responses() {
        let err = CoreError::from_api(
            Operation::GetPredictedStates,
            vpdctl_api::Error::UnexpectedShape("expected a JSON object, got an array".into()),
        );

        assert!(matches!(
            err,
            CoreError::MalformedResponse {
                operation: Operation::GetPredictedStates,
                ..
            }
        ));
    }

    #[test]
    fn invalid_payload_keeps_operation() {
        let err = CoreError::from_api(
            Operation::GetPredictedAction,
            vpdctl_api::Error::InvalidPayload("sensor data must be a JSON object".into()),
        );

        assert_eq!(err.operation(), Some(Operation::GetPredictedAction));
        assert_eq!(err.failure_message(), "Failed to get predicted action");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let message = rejection_message(&body);
        assert_eq!(message.chars().count(), 201);
        assert!(message.ends_with('…'));
    }
}
