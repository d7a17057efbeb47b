//! Device command handlers.

use serde_json::Value;
use tabled::Tabled;

use vpdctl_core::{Dashboard, DeviceName, InfoSource, PowerState};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts, InfoTarget, OutputFormat, SwitchState};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceStateRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "State")]
    state: String,
}

/// Status bodies map device name → state. States arrive as booleans or
/// as "on"/"off" strings depending on backend version.
fn state_rows(status: &Value, color: bool) -> Option<Vec<DeviceStateRow>> {
    let map = status.as_object()?;
    Some(
        map.iter()
            .map(|(device, state)| {
                let on = match state {
                    Value::Bool(on) => Some(*on),
                    Value::String(s) => s.parse::<PowerState>().ok().map(|p| p == PowerState::On),
                    _ => None,
                };
                DeviceStateRow {
                    device: device.clone(),
                    state: on.map_or_else(|| util::scalar(state), |on| output::on_off(on, color)),
                }
            })
            .collect(),
    )
}

fn info_source(target: InfoTarget) -> InfoSource {
    match target {
        InfoTarget::All => InfoSource::All,
        InfoTarget::Exhaust => InfoSource::Exhaust,
        InfoTarget::Humidifier => InfoSource::Humidifier,
        InfoTarget::Dehumidifier => InfoSource::Dehumidifier,
    }
}

fn render_fields(format: &OutputFormat, value: &Value) -> Result<String, CliError> {
    match format {
        OutputFormat::Table if value.is_object() => Ok(output::render_table(&util::field_rows(value))),
        _ => output::render_value(format, value),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::Toggle { device, state } => {
            let name = DeviceName::new(device).map_err(|e| CliError::Validation {
                field: "device".into(),
                reason: e.to_string(),
            })?;
            let state = match state {
                SwitchState::On => PowerState::On,
                SwitchState::Off => PowerState::Off,
            };

            let ack = dashboard.toggle_device(&name, state).await?;

            if ack.is_null() {
                if !global.quiet {
                    eprintln!("{} switched {state}", name.as_str());
                }
            } else {
                output::print_output(&output::render_value(global.format(), &ack)?, global.quiet);
            }
            Ok(())
        }

        DevicesCommand::Status => {
            let status = dashboard.get_device_status().await?;
            let out = match (global.format(), state_rows(&status, util::color(global))) {
                (OutputFormat::Table, Some(rows)) => output::render_table(&rows),
                (format, _) => output::render_value(format, &status)?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Info { target } => {
            let info = dashboard.get_info(info_source(target)).await?;
            output::print_output(&render_fields(global.format(), &info)?, global.quiet);
            Ok(())
        }
    }
}
