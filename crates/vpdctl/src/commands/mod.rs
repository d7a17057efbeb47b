//! Command dispatch: bridges CLI args -> dashboard calls -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod predict;
pub mod sensors;
pub mod settings;
pub mod util;
pub mod vpd;

use vpdctl_core::Dashboard;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Sensors(args) => sensors::handle(dashboard, &args, global).await,
        Command::Devices(args) => devices::handle(dashboard, args, global).await,
        Command::Vpd(args) => vpd::handle(dashboard, args, global).await,
        Command::Anomaly(args) => predict::handle_anomaly(dashboard, &args, global).await,
        Command::Optimize(args) => predict::handle_optimize(dashboard, &args, global).await,
        Command::Predict(args) => predict::handle(dashboard, args, global).await,
        Command::Settings(args) => settings::handle(dashboard, &args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
