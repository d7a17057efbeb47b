//! Config subcommand handlers.

use std::io::Read;

use vpdctl_config::{Config, Profile};
use vpdctl_core::DEFAULT_BACKEND;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

const MASK: &str = "****";

/// Copy of `cfg` with plaintext session cookies masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.session_cookie.is_some() {
            profile.session_cookie = Some(MASK.into());
        }
    }
    cfg
}

/// Format config as TOML-like text, masking secrets.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "backend = \"{}\"", p.backend);
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(endpoint) = p.optimize_endpoint {
            let _ = writeln!(out, "optimize_endpoint = \"{}\"", endpoint.path());
        }
        if p.session_cookie.is_some() {
            let _ = writeln!(out, "session_cookie = \"{MASK}\"");
        }
        if let Some(ref env) = p.session_cookie_env {
            let _ = writeln!(out, "session_cookie_env = \"{env}\"");
        }
    }

    out
}

/// Add (or with `force`, replace) `name` in `cfg`.
fn upsert_profile(
    cfg: &mut Config,
    name: &str,
    profile: Profile,
    force: bool,
) -> Result<(), CliError> {
    if cfg.profiles.contains_key(name) && !force {
        return Err(CliError::Validation {
            field: "profile".into(),
            reason: format!("'{name}' already exists; pass --force to replace it"),
        });
    }
    cfg.profiles.insert(name.to_owned(), profile);
    if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(name.to_owned());
    }
    Ok(())
}

fn read_cookie(arg: Option<String>) -> Result<String, CliError> {
    let raw = match arg {
        Some(cookie) if cookie != "-" => cookie,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let cookie = raw.trim().to_owned();
    if cookie.is_empty() {
        return Err(CliError::Validation {
            field: "cookie".into(),
            reason: "session cookie cannot be empty".into(),
        });
    }
    Ok(cookie)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let mut cfg = vpdctl_config::load_config()?;
            let name = config::active_profile_name(global, &cfg);

            let backend = global.backend.as_deref().unwrap_or(DEFAULT_BACKEND);
            vpdctl_config::parse_backend(backend)?;

            let mut profile = Profile::new(backend);
            profile.timeout = global.timeout;
            profile.insecure = global.insecure.then_some(true);

            upsert_profile(&mut cfg, &name, profile, force)?;
            let path = vpdctl_config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Profile '{name}' -> {backend}");
                eprintln!("Saved {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = vpdctl_config::load_config()?;
            let out = match global.format() {
                OutputFormat::Table | OutputFormat::Plain => format_config_redacted(&cfg),
                format => output::render_single(format, &redacted(&cfg), |_| String::new(), |_| {
                    String::new()
                })?,
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&vpdctl_config::config_path().display().to_string(), false);
            Ok(())
        }

        ConfigCommand::SetSession { cookie } => {
            let cfg = vpdctl_config::load_config_or_default();
            let name = config::active_profile_name(global, &cfg);
            let cookie = read_cookie(cookie)?;

            vpdctl_config::store_session_cookie(&name, &cookie)?;
            if !global.quiet {
                eprintln!("Session cookie for '{name}' stored in system keyring");
            }
            Ok(())
        }
    }
}
