//! Backend configuration handler.

use serde::Serialize;
use tabled::Tabled;

use vpdctl_core::{ConfigSettings, Dashboard, DeviceKind, GrowthStage};

use crate::cli::{GlobalOpts, OutputFormat, SettingsArgs, SettingsSection};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Clone, Tabled, Serialize)]
struct ModeRow {
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Low kPa")]
    low: f64,
    #[tabled(rename = "High kPa")]
    high: f64,
}

#[derive(Clone, Tabled, Serialize)]
struct ActionRow {
    #[tabled(rename = "Index")]
    index: String,
    #[tabled(rename = "Action")]
    action: String,
}

#[derive(Clone, Tabled, Serialize)]
struct HumidityRow {
    #[tabled(rename = "Stage")]
    stage: GrowthStage,
    #[tabled(rename = "Max humidity %")]
    max: f64,
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device")]
    device: DeviceKind,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Model")]
    model: String,
}

fn mode_rows(s: &ConfigSettings) -> Vec<ModeRow> {
    s.vpd_modes
        .iter()
        .map(|(mode, band)| ModeRow {
            mode: mode.clone(),
            low: band[0],
            high: band[1],
        })
        .collect()
}

/// Sorted numerically; the wire keys are strings.
fn action_rows(s: &ConfigSettings) -> Vec<ActionRow> {
    let mut rows: Vec<_> = s
        .action_map
        .iter()
        .map(|(index, action)| ActionRow {
            index: index.clone(),
            action: action.clone(),
        })
        .collect();
    rows.sort_by_key(|row| row.index.parse::<u32>().unwrap_or(u32::MAX));
    rows
}

fn humidity_rows(s: &ConfigSettings) -> Vec<HumidityRow> {
    GrowthStage::ALL
        .into_iter()
        .map(|stage| HumidityRow {
            stage,
            max: s.max_humidity(stage),
        })
        .collect()
}

fn device_rows(s: &ConfigSettings) -> Vec<DeviceRow> {
    DeviceKind::ALL
        .into_iter()
        .map(|kind| {
            let device = s.device(kind);
            DeviceRow {
                device: kind,
                ip: device.ip.clone(),
                model: device.model.to_string(),
            }
        })
        .collect()
}

fn bound(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.2}"))
}

fn target_detail(s: &ConfigSettings) -> String {
    [
        format!("Target min:  {} kPa", bound(s.vpd_target.min)),
        format!("Target max:  {} kPa", bound(s.vpd_target.max)),
        format!("Tolerance:   {:.2} kPa", s.kpa_tolerance),
        format!("Leaf offset: {:+.1} °C", s.leaf_temp_offset),
        format!("Stream URL:  {}", s.ws_url),
    ]
    .join("\n")
}

fn full_detail(s: &ConfigSettings) -> String {
    [
        target_detail(s),
        output::render_table(&mode_rows(s)),
        output::render_table(&action_rows(s)),
        output::render_table(&humidity_rows(s)),
        output::render_table(&device_rows(s)),
    ]
    .join("\n\n")
}

fn render_section(
    format: &OutputFormat,
    settings: &ConfigSettings,
    section: SettingsSection,
) -> Result<String, CliError> {
    match section {
        SettingsSection::Target => output::render_single(
            format,
            &settings.vpd_target,
            |_| target_detail(settings),
            |t| format!("{} {}", bound(t.min), bound(t.max)),
        ),
        SettingsSection::Modes => output::render_list(
            format,
            &mode_rows(settings),
            ModeRow::clone,
            |r| format!("{}\t{}\t{}", r.mode, r.low, r.high),
        ),
        SettingsSection::Actions => output::render_list(
            format,
            &action_rows(settings),
            ActionRow::clone,
            |r| format!("{}\t{}", r.index, r.action),
        ),
        SettingsSection::Humidity => output::render_list(
            format,
            &humidity_rows(settings),
            HumidityRow::clone,
            |r| format!("{}\t{}", r.stage, r.max),
        ),
        SettingsSection::Devices => output::render_single(
            format,
            &settings.device_map,
            |_| output::render_table(&device_rows(settings)),
            |_| {
                device_rows(settings)
                    .iter()
                    .map(|r| format!("{}\t{}", r.device, r.ip))
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        ),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: &SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = dashboard.fetch_config_settings().await?;
    tracing::debug!(?outcome, "config settings fetched");

    let Some(snapshot) = dashboard.store().snapshot() else {
        return Ok(());
    };
    let settings = &snapshot.settings;

    let out = match args.section {
        Some(section) => render_section(global.format(), settings, section)?,
        None => output::render_single(global.format(), settings, full_detail, |s| {
            format!("{} {}", bound(s.vpd_target.min), bound(s.vpd_target.max))
        })?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
