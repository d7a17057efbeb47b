//! Shared helpers for command handlers.

use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tabled::Tabled;

use vpdctl_core::{Dashboard, SensorPayload};

use crate::cli::{GlobalOpts, PayloadArgs};
use crate::error::CliError;
use crate::output;

/// Whether this invocation should emit color codes.
pub fn color(global: &GlobalOpts) -> bool {
    output::should_color(&global.color)
}

/// Payload for the model endpoints: `--input` if given, else the live
/// sensor reading.
pub async fn resolve_payload(
    dashboard: &Dashboard,
    args: &PayloadArgs,
) -> Result<SensorPayload, CliError> {
    match args.input {
        Some(ref path) => read_payload(path),
        None => {
            let reading = dashboard.get_sensor_data().await?;
            Ok(SensorPayload::from(&reading))
        }
    }
}

/// Read a JSON object from `path`, or stdin when `path` is `-`.
pub fn read_payload(path: &Path) -> Result<SensorPayload, CliError> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    parse_payload(&contents)
}

fn parse_payload(contents: &str) -> Result<SensorPayload, CliError> {
    let value: Value = serde_json::from_str(contents)?;
    SensorPayload::try_from(value).map_err(|e| CliError::Validation {
        field: "input".into(),
        reason: e.to_string(),
    })
}

// ── Key/value tables ─────────────────────────────────────────────────

#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One row per top-level key. Non-objects become a single `value` row.
pub fn field_rows(value: &Value) -> Vec<FieldRow> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| FieldRow {
                field: k.clone(),
                value: scalar(v),
            })
            .collect(),
        other => vec![FieldRow {
            field: "value".into(),
            value: scalar(other),
        }],
    }
}

/// Display form of a JSON value without quotes around strings.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "-".into(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn payload_must_be_an_object() {
        assert!(parse_payload(r#"{"temperature": 24.5}"#).is_ok());
        assert!(matches!(
            parse_payload("[1, 2]"),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(parse_payload("{"), Err(CliError::Json(_))));
    }

    #[test]
    fn field_rows_from_object() {
        let rows = field_rows(&json!({ "ip": "10.0.0.3", "on": true, "alias": null }));
        let flat: Vec<_> = rows.iter().map(|r| (r.field.as_str(), r.value.as_str())).collect();
        assert_eq!(flat, [("alias", "-"), ("ip", "10.0.0.3"), ("on", "true")]);
    }
}
