// vpdctl-core: State and error layer between vpdctl-api and consumers (CLI).

pub mod config;
pub mod dashboard;
pub mod error;
pub mod operation;
pub mod store;
pub mod vpd;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_BACKEND, DashboardConfig, TlsVerification};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use operation::Operation;
pub use store::{ApplyOutcome, ConfigSnapshot, ConfigStore, FetchTicket};
pub use vpd::VpdCheck;

// Re-export wire types at the crate root so consumers need only one crate.
pub use vpdctl_api::{
    AnomalyVerdict, ConfigSettings, DeviceKind, DeviceModel, DeviceName, GrowthStage, InfoSource,
    OptimizeEndpoint, PowerState, PredictedStates, SensorPayload, SensorReading, UNKNOWN_ACTION,
    VpdRange, VpdTarget,
};
