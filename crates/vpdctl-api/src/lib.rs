// vpdctl-api: Async Rust client for the VPD environmental-control backend

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod devices;
mod predict;
mod sensors;
mod settings;
mod targets;

pub use client::VpdClient;
pub use predict::UNKNOWN_ACTION;
pub use error::Error;
pub use models::{
    AnomalyRequest, AnomalyVerdict, ConfigSettings, DeviceConfig, DeviceKind, DeviceMap,
    DeviceModel, DeviceName, GrowthStage, InfoSource, MaxHumidityLevels, OptimizeEndpoint,
    PowerState, PredictedStates, SensorPayload, SensorReading, VpdRange, VpdTarget,
};
pub use transport::{TlsMode, TransportConfig};
