//! Sensor command handler.

use serde::Serialize;

use vpdctl_core::{Dashboard, SensorReading, VpdCheck};

use crate::cli::{GlobalOpts, SensorsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct SensorReport {
    reading: SensorReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check: Option<VpdCheck>,
}

fn duty(level: Option<f64>) -> String {
    level.map_or_else(|| "-".into(), |v| format!("{v:.2}"))
}

fn detail(report: &SensorReport, color: bool) -> String {
    let r = &report.reading;
    let mut lines = vec![
        format!("Temperature:  {:.1} °C", r.temperature),
        format!("Leaf temp:    {:.1} °C", r.leaf_temperature),
        format!("Humidity:     {:.1} %", r.humidity),
        format!("VPD (air):    {:.2} kPa", r.vpd_air),
        format!("VPD (leaf):   {:.2} kPa", r.vpd_leaf),
        format!("Exhaust:      {}", duty(r.exhaust)),
        format!("Humidifier:   {}", duty(r.humidifier)),
        format!("Dehumidifier: {}", duty(r.dehumidifier)),
    ];

    if let Some(ref check) = report.check {
        lines.push(String::new());
        if let Some(ref stage) = report.stage {
            lines.push(format!("Stage:        {stage}"));
        }
        lines.push(format!("Mode:         {}", check.mode.as_deref().unwrap_or("-")));
        lines.push(format!(
            "Air VPD:      {:.2} kPa (computed)",
            check.computed_air
        ));
        lines.push(format!(
            "Leaf VPD:     {:.2} kPa (computed), {:.2} kPa (from offset)",
            check.computed_leaf, check.estimated_leaf
        ));
        lines.push(format!(
            "On target:    {}",
            output::verdict(
                if check.within_target { "yes" } else { "no" },
                check.within_target,
                color
            )
        ));
        if let Some(over) = check.humidity_over_limit {
            lines.push(format!(
                "Humidity cap: {}",
                output::verdict(if over { "exceeded" } else { "ok" }, !over, color)
            ));
        }
    }

    lines.join("\n")
}

pub async fn handle(
    dashboard: &Dashboard,
    args: &SensorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let reading = dashboard.get_sensor_data().await?;

    let report = if args.check {
        dashboard.fetch_config_settings().await?;
        let target = dashboard.get_vpd_target().await?;
        let check = dashboard
            .store()
            .snapshot()
            .map(|snap| VpdCheck::evaluate(&reading, &snap.settings, Some(&target.stage)));
        SensorReport {
            reading,
            stage: Some(target.stage),
            check,
        }
    } else {
        SensorReport {
            reading,
            stage: None,
            check: None,
        }
    };

    let color = util::color(global);
    let out = output::render_single(
        global.format(),
        &report,
        |r| detail(r, color),
        |r| format!("{:.2}", r.reading.vpd_leaf),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
