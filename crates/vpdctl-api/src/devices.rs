// Device endpoints
//
// Power toggles plus the status and info dumps. The status/info shapes
// are owned by the backend and passed through as JSON.

use serde_json::Value;
use tracing::debug;

use crate::client::VpdClient;
use crate::error::Error;
use crate::models::{DeviceName, InfoSource, PowerState};

impl VpdClient {
    /// Switch a device on or off.
    ///
    /// `POST /{device}/{state}` with no body; returns the backend's ack.
    pub async fn toggle_device(&self, device: &DeviceName, state: PowerState) -> Result<Value, Error> {
        debug!(%device, %state, "toggling device");
        self.post_empty(&format!("{device}/{state}")).await
    }

    /// `GET /device_status`
    pub async fn get_device_status(&self) -> Result<Value, Error> {
        debug!("fetching device status");
        self.get_json("device_status").await
    }

    /// Read one of the info dumps.
    pub async fn get_info(&self, source: InfoSource) -> Result<Value, Error> {
        debug!(path = source.path(), "fetching device info");
        self.get_json(source.path()).await
    }

    /// `GET /device_info_json`
    pub async fn get_device_info(&self) -> Result<Value, Error> {
        self.get_info(InfoSource::All).await
    }

    /// `GET /exhaust_info_json`
    pub async fn get_exhaust_info(&self) -> Result<Value, Error> {
        self.get_info(InfoSource::Exhaust).await
    }

    /// `GET /humidifier_info_json`
    pub async fn get_humidifier_info(&self) -> Result<Value, Error> {
        self.get_info(InfoSource::Humidifier).await
    }

    /// `GET /dehumidifier_info_json`
    pub async fn get_dehumidifier_info(&self) -> Result<Value, Error> {
        self.get_info(InfoSource::Dehumidifier).await
    }
}
