//! VPD target command handlers.

use vpdctl_core::{Dashboard, GrowthStage, VpdTarget};

use crate::cli::{GlobalOpts, VpdArgs, VpdCommand};
use crate::error::CliError;
use crate::output;

fn detail(target: &VpdTarget) -> String {
    let known = target.stage.parse::<GrowthStage>().is_ok();
    if known {
        format!("Stage: {}", target.stage)
    } else {
        format!("Stage: {} (custom)", target.stage)
    }
}

pub async fn handle(dashboard: &Dashboard, args: VpdArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        VpdCommand::Get => {
            let target = dashboard.get_vpd_target().await?;
            let out = output::render_single(global.format(), &target, detail, |t| t.stage.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VpdCommand::Set { stage } => {
            let stage = stage.trim();
            if stage.is_empty() {
                return Err(CliError::Validation {
                    field: "stage".into(),
                    reason: "stage name cannot be empty".into(),
                });
            }

            dashboard.set_vpd_target(stage).await?;
            if !global.quiet {
                eprintln!("VPD target set to {stage}");
            }
            Ok(())
        }
    }
}
