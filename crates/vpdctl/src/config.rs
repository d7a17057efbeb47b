//! CLI flag overrides on top of `vpdctl-config`.
//!
//! Core never sees these types -- it receives a finished `DashboardConfig`.

use std::time::Duration;

use clap::ValueEnum;
use vpdctl_config::{Config, Profile};
use vpdctl_core::{DashboardConfig, TlsVerification};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Profile name selected by `--profile`, the config default, or `"default"`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Build the `DashboardConfig` for this invocation.
///
/// Precedence: CLI flags / `VPDCTL_*` env, then the active profile, then
/// built-in defaults. Without any profile the default backend is used, so
/// a fresh install works with no config file.
pub fn resolve_dashboard_config(
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<DashboardConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut config = match cfg.profiles.get(&profile_name) {
        Some(profile) => {
            vpdctl_config::profile_to_dashboard_config(profile, &profile_name, &cfg.defaults)?
        }
        None if global.profile.is_some() && global.backend.is_none() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        None => vpdctl_config::profile_to_dashboard_config(
            &Profile::default(),
            &profile_name,
            &cfg.defaults,
        )?,
    };

    if let Some(ref backend) = global.backend {
        config.backend = vpdctl_config::parse_backend(backend)?;
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(
        profile = %profile_name,
        backend = %config.backend,
        timeout_secs = config.timeout.as_secs(),
        "resolved dashboard config"
    );
    Ok(config)
}

/// Fill `--output` from `[defaults] output` when neither the flag nor
/// `VPDCTL_OUTPUT` chose a format.
pub fn apply_output_default(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        let format = <OutputFormat as ValueEnum>::from_str(&cfg.defaults.output, true).map_err(
            |reason| CliError::Validation {
                field: "defaults.output".into(),
                reason,
            },
        )?;
        global.output = Some(format);
    }
    Ok(())
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    let mut names: Vec<_> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}
