// ── Dashboard facade ──
//
// One entry point for every backend operation. Each call goes through
// `call`, which logs the failure and tags the error with its `Operation`.
// Configuration fetches additionally land in the `ConfigStore`.

use std::future::Future;
use std::sync::Arc;

use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};

use vpdctl_api::transport::{TlsMode, TransportConfig};
use vpdctl_api::{
    AnomalyVerdict, ConfigSettings, DeviceName, InfoSource, PowerState, PredictedStates,
    SensorPayload, SensorReading, VpdClient, VpdTarget,
};

use crate::config::{DashboardConfig, TlsVerification};
use crate::error::CoreError;
use crate::operation::Operation;
use crate::store::{ApplyOutcome, ConfigStore};

/// Cheaply cloneable handle to one backend.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    client: VpdClient,
    store: ConfigStore,
}

impl Dashboard {
    /// Build the HTTP client for `config`. Nothing is sent until the first
    /// operation.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = VpdClient::new(config.backend.clone(), &transport)
            .map_err(|e| CoreError::Config {
                message: e.to_string(),
            })?
            .with_optimize_endpoint(config.optimize_endpoint);

        debug!(backend = %config.backend, "dashboard client ready");
        Ok(Self::from_client(config, client))
    }

    /// Wrap an already-built client.
    pub fn from_client(config: DashboardConfig, client: VpdClient) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                store: ConfigStore::new(),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    /// The configuration store fed by [`fetch_config_settings`](Self::fetch_config_settings).
    pub fn store(&self) -> &ConfigStore {
        &self.inner.store
    }

    pub fn client(&self) -> &VpdClient {
        &self.inner.client
    }

    async fn call<T, F>(&self, operation: Operation, request: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, vpdctl_api::Error>>,
    {
        request.await.map_err(|e| {
            warn!(%operation, error = %e, "{}", operation.failure_message());
            CoreError::from_api(operation, e)
        })
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub async fn toggle_device(
        &self,
        device: &DeviceName,
        state: PowerState,
    ) -> Result<Value, CoreError> {
        self.call(
            Operation::ToggleDevice,
            self.inner.client.toggle_device(device, state),
        )
        .await
    }

    pub async fn get_device_status(&self) -> Result<Value, CoreError> {
        self.call(
            Operation::GetDeviceStatus,
            self.inner.client.get_device_status(),
        )
        .await
    }

    /// Fetch one of the info endpoints.
    pub async fn get_info(&self, source: InfoSource) -> Result<Value, CoreError> {
        let operation = match source {
            InfoSource::All => Operation::GetDeviceInfo,
            InfoSource::Exhaust => Operation::GetExhaustInfo,
            InfoSource::Humidifier => Operation::GetHumidifierInfo,
            InfoSource::Dehumidifier => Operation::GetDehumidifierInfo,
        };
        self.call(operation, self.inner.client.get_info(source)).await
    }

    pub async fn get_device_info(&self) -> Result<Value, CoreError> {
        self.get_info(InfoSource::All).await
    }

    pub async fn get_exhaust_info(&self) -> Result<Value, CoreError> {
        self.get_info(InfoSource::Exhaust).await
    }

    pub async fn get_humidifier_info(&self) -> Result<Value, CoreError> {
        self.get_info(InfoSource::Humidifier).await
    }

    pub async fn get_dehumidifier_info(&self) -> Result<Value, CoreError> {
        self.get_info(InfoSource::Dehumidifier).await
    }

    // ── Sensors and targets ──────────────────────────────────────────

    pub async fn get_sensor_data(&self) -> Result<SensorReading, CoreError> {
        self.call(
            Operation::GetSensorData,
            self.inner.client.get_sensor_data(),
        )
        .await
    }

    pub async fn set_vpd_target(&self, stage: &str) -> Result<(), CoreError> {
        self.call(
            Operation::SetVpdTarget,
            self.inner.client.set_vpd_target(stage),
        )
        .await
    }

    pub async fn get_vpd_target(&self) -> Result<VpdTarget, CoreError> {
        self.call(Operation::GetVpdTarget, self.inner.client.get_vpd_target())
            .await
    }

    // ── Predictions ──────────────────────────────────────────────────

    pub async fn detect_anomaly(&self, payload: &SensorPayload) -> Result<AnomalyVerdict, CoreError> {
        self.call(
            Operation::DetectAnomaly,
            self.inner.client.detect_anomaly(payload),
        )
        .await
    }

    pub async fn get_optimized_control(&self, payload: &SensorPayload) -> Result<String, CoreError> {
        self.call(
            Operation::GetOptimizedControl,
            self.inner.client.get_optimized_control(payload),
        )
        .await
    }

    pub async fn get_predicted_action(&self, payload: &SensorPayload) -> Result<String, CoreError> {
        self.call(
            Operation::GetPredictedAction,
            self.inner.client.get_predicted_action(payload),
        )
        .await
    }

    pub async fn get_predicted_states(
        &self,
        payload: &SensorPayload,
    ) -> Result<PredictedStates, CoreError> {
        self.call(
            Operation::GetPredictedStates,
            self.inner.client.get_predicted_states(payload),
        )
        .await
    }

    pub async fn get_prediction_data(&self) -> Result<Value, CoreError> {
        self.call(
            Operation::GetPredictionData,
            self.inner.client.get_prediction_data(),
        )
        .await
    }

    // ── Configuration ────────────────────────────────────────────────

    /// Fetch the backend configuration and replace the stored snapshot.
    ///
    /// On failure the previous snapshot (possibly none) stays in place.
    pub async fn fetch_config_settings(&self) -> Result<ApplyOutcome, CoreError> {
        let ticket = self.inner.store.begin_fetch();
        let settings: ConfigSettings = self
            .call(
                Operation::FetchConfigSettings,
                self.inner.client.get_config_settings(),
            )
            .await?;
        Ok(self.inner.store.apply(ticket, settings))
    }
}

fn build_transport(config: &DashboardConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };

    let transport = TransportConfig {
        tls,
        timeout: config.timeout,
        cookie_jar: None,
    }
    .with_cookie_jar();

    match &config.session_cookie {
        Some(cookie) => transport.with_session_cookie(cookie.expose_secret(), &config.backend),
        None => transport,
    }
}
