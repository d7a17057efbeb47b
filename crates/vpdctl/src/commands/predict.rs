//! Anomaly, optimizer, and prediction command handlers.

use serde::Serialize;
use tabled::Tabled;

use vpdctl_core::{AnomalyVerdict, Dashboard, PredictedStates, UNKNOWN_ACTION};

use crate::cli::{GlobalOpts, OutputFormat, PayloadArgs, PredictArgs, PredictCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct PredictedStateRow {
    #[tabled(rename = "Device")]
    device: &'static str,
    #[tabled(rename = "Predicted")]
    state: String,
}

#[derive(Serialize)]
struct ActionReport<'a> {
    action: &'a str,
}

fn anomaly_detail(verdict: &AnomalyVerdict, color: bool) -> String {
    let mut lines = vec![format!(
        "Anomaly: {}",
        output::verdict(
            if verdict.anomaly_detected { "detected" } else { "none" },
            !verdict.anomaly_detected,
            color
        )
    )];
    for (key, value) in &verdict.details {
        lines.push(format!("{key}: {}", util::scalar(value)));
    }
    lines.join("\n")
}

fn state_rows(states: &PredictedStates, color: bool) -> Vec<PredictedStateRow> {
    [
        ("exhaust", states.exhaust),
        ("humidifier", states.humidifier),
        ("dehumidifier", states.dehumidifier),
    ]
    .into_iter()
    .map(|(device, on)| PredictedStateRow {
        device,
        state: output::on_off(on, color),
    })
    .collect()
}

fn print_action(label: &str, action: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let report = ActionReport { action };
    let out = output::render_single(
        global.format(),
        &report,
        |r| {
            if r.action == UNKNOWN_ACTION {
                format!("{label}: (model gave no action)")
            } else {
                format!("{label}: {}", r.action)
            }
        },
        |r| r.action.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_anomaly(
    dashboard: &Dashboard,
    args: &PayloadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let payload = util::resolve_payload(dashboard, args).await?;
    let verdict = dashboard.detect_anomaly(&payload).await?;

    let color = util::color(global);
    let out = output::render_single(
        global.format(),
        &verdict,
        |v| anomaly_detail(v, color),
        |v| v.anomaly_detected.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_optimize(
    dashboard: &Dashboard,
    args: &PayloadArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let payload = util::resolve_payload(dashboard, args).await?;
    let action = dashboard.get_optimized_control(&payload).await?;
    print_action("Best action", &action, global)
}

pub async fn handle(
    dashboard: &Dashboard,
    args: PredictArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PredictCommand::Action(payload_args) => {
            let payload = util::resolve_payload(dashboard, &payload_args).await?;
            let action = dashboard.get_predicted_action(&payload).await?;
            print_action("Predicted action", &action, global)
        }

        PredictCommand::States(payload_args) => {
            let payload = util::resolve_payload(dashboard, &payload_args).await?;
            let states = dashboard.get_predicted_states(&payload).await?;

            let out = match global.format() {
                OutputFormat::Table => output::render_table(&state_rows(&states, util::color(global))),
                format => output::render_single(
                    format,
                    &states,
                    |_| String::new(),
                    |s| {
                        format!(
                            "exhaust={}\nhumidifier={}\ndehumidifier={}",
                            s.exhaust, s.humidifier, s.dehumidifier
                        )
                    },
                )?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PredictCommand::Data => {
            let data = dashboard.get_prediction_data().await?;
            output::print_output(&output::render_value(global.format(), &data)?, global.quiet);
            Ok(())
        }
    }
}
