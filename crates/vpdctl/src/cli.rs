//! Clap derive structures for the `vpdctl` CLI.
//!
//! Only depends on clap and clap_complete so `build.rs` can include it to
//! render man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vpdctl -- drive a VPD grow-room dashboard backend from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "vpdctl",
    version,
    about = "Monitor and control a VPD grow-room backend from the command line",
    long_about = "Reads sensors, toggles smart plugs, sets VPD targets, and queries the\n\
        backend's anomaly and prediction models.\n\n\
        Every command talks to one backend origin, taken from --backend or the\n\
        active profile in the config file.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "VPDCTL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend origin URL (overrides profile)
    #[arg(long, short = 'b', env = "VPDCTL_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format [default: `[defaults] output`, else table]
    #[arg(long, short = 'o', env = "VPDCTL_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "VPDCTL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "VPDCTL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,
}

impl GlobalOpts {
    /// Selected output format, table when neither flag nor config set one.
    pub fn format(&self) -> &OutputFormat {
        self.output.as_ref().unwrap_or(&OutputFormat::Table)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current sensor reading
    #[command(alias = "s")]
    Sensors(SensorsArgs),

    /// Toggle smart plugs and query device state
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Read or change the VPD growth-stage target
    Vpd(VpdArgs),

    /// Ask the backend whether a reading looks anomalous
    Anomaly(PayloadArgs),

    /// Ask the optimizer for the best control action
    Optimize(PayloadArgs),

    /// Query the prediction models
    Predict(PredictArgs),

    /// Show the backend configuration
    Settings(SettingsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Sensors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SensorsArgs {
    /// Recompute VPD locally and check it against the backend's target
    #[arg(long)]
    pub check: bool,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// Switch a device on or off
    Toggle {
        /// Device name (e.g., exhaust, humidifier, dehumidifier)
        device: String,

        /// Desired power state
        state: SwitchState,
    },

    /// Show the power state of every device
    Status,

    /// Show device details from the info endpoints
    Info {
        /// Which device to describe
        #[arg(default_value = "all")]
        target: InfoTarget,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SwitchState {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InfoTarget {
    All,
    Exhaust,
    Humidifier,
    Dehumidifier,
}

// ── VPD target ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VpdArgs {
    #[command(subcommand)]
    pub command: VpdCommand,
}

#[derive(Debug, Subcommand)]
pub enum VpdCommand {
    /// Show the active growth-stage target
    Get,

    /// Switch to another growth-stage target
    Set {
        /// Stage name (e.g., propagation, vegetative, flowering)
        stage: String,
    },
}

// ── Predictions ──────────────────────────────────────────────────────

/// Sensor payload source shared by the model commands.
#[derive(Debug, Args)]
pub struct PayloadArgs {
    /// JSON object to send instead of the live reading ("-" reads stdin)
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PredictArgs {
    #[command(subcommand)]
    pub command: PredictCommand,
}

#[derive(Debug, Subcommand)]
pub enum PredictCommand {
    /// Predict the next control action
    Action(PayloadArgs),

    /// Predict the on/off state of each device
    States(PayloadArgs),

    /// Dump the backend's prediction history
    Data,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Only show one part of the configuration
    #[arg(long, short = 's')]
    pub section: Option<SettingsSection>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SettingsSection {
    /// VPD target band and tolerance
    Target,
    /// Named VPD modes
    Modes,
    /// Optimizer action names
    Actions,
    /// Humidity ceilings per growth stage
    Humidity,
    /// Smart plug addresses and models
    Devices,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile in the config file
    Init {
        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,
    },

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,

    /// Store a session cookie in the system keyring
    SetSession {
        /// Cookie as name=value ("-" or omitted reads stdin)
        cookie: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
