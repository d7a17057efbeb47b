// Backend request/response models
//
// Wire shapes for every endpoint. Responses the backend leaves
// implementation-defined (device status, info dumps, prediction data)
// stay as `serde_json::Value`; everything with a documented shape is typed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

// ── Devices ─────────────────────────────────────────────────────────

/// Desired power state for a toggle. Sent on the wire as `on` / `off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl From<bool> for PowerState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Ok(Self::On),
            "off" | "false" | "0" => Ok(Self::Off),
            other => Err(Error::InvalidPayload(format!(
                "power state must be 'on' or 'off', got '{other}'"
            ))),
        }
    }
}

/// A device name as it appears in the toggle path (`/{device}/{state}`).
///
/// The backend decides which names exist; locally we only guarantee the
/// name is a single, non-empty path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceName(String);

impl DeviceName {
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidPayload("device name is empty".into()));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(Error::InvalidPayload(format!(
                "device name '{name}' contains '{bad}'; only letters, digits, '_' and '-' are allowed"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Which info dump to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoSource {
    /// Combined info for every device (`/device_info_json`).
    All,
    Exhaust,
    Humidifier,
    Dehumidifier,
}

impl InfoSource {
    pub fn path(self) -> &'static str {
        match self {
            Self::All => "device_info_json",
            Self::Exhaust => "exhaust_info_json",
            Self::Humidifier => "humidifier_info_json",
            Self::Dehumidifier => "dehumidifier_info_json",
        }
    }
}

// ── Sensors ─────────────────────────────────────────────────────────

/// One snapshot from the sensor hub.
///
/// Temperatures in °C, humidity in %, VPD in kPa. Duty levels are present
/// only when the backend reports device activity alongside the reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub temperature: f64,
    pub humidity: f64,
    pub leaf_temperature: f64,
    pub vpd_air: f64,
    pub vpd_leaf: f64,
    #[serde(default, deserialize_with = "duty_level", skip_serializing_if = "Option::is_none")]
    pub exhaust: Option<f64>,
    #[serde(default, deserialize_with = "duty_level", skip_serializing_if = "Option::is_none")]
    pub humidifier: Option<f64>,
    #[serde(default, deserialize_with = "duty_level", skip_serializing_if = "Option::is_none")]
    pub dehumidifier: Option<f64>,
    /// Fields this client doesn't model.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Duty levels arrive either as numbers or as on/off booleans.
fn duty_level<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Level {
        Number(f64),
        Flag(bool),
    }

    Ok(Option::<Level>::deserialize(deserializer)?.map(|level| match level {
        Level::Number(n) => n,
        Level::Flag(on) => f64::from(u8::from(on)),
    }))
}

/// Sensor data sent to the anomaly / optimize / predict endpoints.
///
/// Always a JSON object. Build one from a [`SensorReading`] or convert an
/// arbitrary `serde_json::Value` with `try_from`, which rejects anything
/// that isn't an object.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct SensorPayload(Map<String, Value>);

impl SensorPayload {
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Numeric value of `key`. Booleans count as `1` / `0`; anything else
    /// (missing, string, null) is `None`.
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::Bool(b) => Some(f64::from(u8::from(*b))),
            _ => None,
        }
    }
}

impl TryFrom<Value> for SensorPayload {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::InvalidPayload(format!(
                "sensor data must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl From<Map<String, Value>> for SensorPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<&SensorReading> for SensorPayload {
    fn from(reading: &SensorReading) -> Self {
        let mut map = reading.extra.clone();
        map.insert("temperature".into(), reading.temperature.into());
        map.insert("humidity".into(), reading.humidity.into());
        map.insert("leaf_temperature".into(), reading.leaf_temperature.into());
        map.insert("vpd_air".into(), reading.vpd_air.into());
        map.insert("vpd_leaf".into(), reading.vpd_leaf.into());
        for (key, level) in [
            ("exhaust", reading.exhaust),
            ("humidifier", reading.humidifier),
            ("dehumidifier", reading.dehumidifier),
        ] {
            if let Some(level) = level {
                map.insert(key.into(), level.into());
            }
        }
        Self(map)
    }
}

/// Human name for a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Anomaly detection ───────────────────────────────────────────────

/// Body for `POST /detect_anomaly`: exactly these eight fields, with `0`
/// standing in for anything the payload lacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyRequest {
    pub temperature: f64,
    pub leaf_temperature: f64,
    pub humidity: f64,
    pub vpd_air: f64,
    pub vpd_leaf: f64,
    pub exhaust: f64,
    pub humidifier: f64,
    pub dehumidifier: f64,
}

impl From<&SensorPayload> for AnomalyRequest {
    fn from(payload: &SensorPayload) -> Self {
        let field = |key: &str| payload.number(key).unwrap_or(0.0);
        Self {
            temperature: field("temperature"),
            leaf_temperature: field("leaf_temperature"),
            humidity: field("humidity"),
            vpd_air: field("vpd_air"),
            vpd_leaf: field("vpd_leaf"),
            exhaust: field("exhaust"),
            humidifier: field("humidifier"),
            dehumidifier: field("dehumidifier"),
        }
    }
}

/// Result of anomaly detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyVerdict {
    pub anomaly_detected: bool,
    /// Anything else the model reports (scores, offending fields, ...).
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

// ── Predictions ─────────────────────────────────────────────────────

/// Where the optimizer lives. The backend renamed the endpoint once;
/// both names are still deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizeEndpoint {
    /// `POST /optimize_control`
    #[default]
    OptimizeControl,
    /// `POST /adjust_conditions`
    AdjustConditions,
}

impl OptimizeEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::OptimizeControl => "optimize_control",
            Self::AdjustConditions => "adjust_conditions",
        }
    }
}

/// Recommended on/off state for each controllable device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PredictedStates {
    pub exhaust: bool,
    pub humidifier: bool,
    pub dehumidifier: bool,
}

impl PredictedStates {
    /// Read the three flags from a response object. Missing or
    /// non-boolean flags are `false`.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let flag = |key: &str| object.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            exhaust: flag("exhaust"),
            humidifier: flag("humidifier"),
            dehumidifier: flag("dehumidifier"),
        }
    }
}

// ── VPD target ──────────────────────────────────────────────────────

/// The growth-stage VPD target the controller is steering towards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpdTarget {
    pub stage: String,
}

/// Growth stages with their own humidity ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Propagation,
    Vegetative,
    Flowering,
}

impl GrowthStage {
    pub const ALL: [Self; 3] = [Self::Propagation, Self::Vegetative, Self::Flowering];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Propagation => "propagation",
            Self::Vegetative => "vegetative",
            Self::Flowering => "flowering",
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrowthStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidPayload(format!("unknown growth stage '{s}'")))
    }
}

// ── Config settings ─────────────────────────────────────────────────

/// Backend configuration served by `GET /config-settings`.
///
/// Wire names are upper case. Fields this client doesn't model are kept in
/// `extra` so the snapshot round-trips verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSettings {
    /// Allowed deviation from the VPD target, in kPa.
    #[serde(rename = "KPA_TOLERANCE")]
    pub kpa_tolerance: f64,
    /// Leaf temperature relative to air temperature, in °C.
    #[serde(rename = "LEAF_TEMP_OFFSET")]
    pub leaf_temp_offset: f64,
    #[serde(rename = "VPD_TARGET")]
    pub vpd_target: VpdRange,
    /// Named VPD bands, `name → [low, high]` in kPa.
    #[serde(rename = "VPD_MODES", default)]
    pub vpd_modes: BTreeMap<String, [f64; 2]>,
    /// Optimizer action index → action name. Keys are decimal strings on
    /// the wire.
    #[serde(rename = "ACTION_MAP", default)]
    pub action_map: BTreeMap<String, String>,
    #[serde(rename = "MAX_HUMIDITY_LEVELS")]
    pub max_humidity_levels: MaxHumidityLevels,
    #[serde(rename = "DEVICE_MAP")]
    pub device_map: DeviceMap,
    #[serde(rename = "WS_URL")]
    pub ws_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigSettings {
    /// Name of optimizer action `index`, if the map has one.
    pub fn action_name(&self, index: u32) -> Option<&str> {
        self.action_map.get(&index.to_string()).map(String::as_str)
    }

    /// The first VPD mode (by name) whose band contains `vpd`.
    pub fn mode_for(&self, vpd: f64) -> Option<&str> {
        self.vpd_modes
            .iter()
            .find(|(_, band)| (band[0]..=band[1]).contains(&vpd))
            .map(|(name, _)| name.as_str())
    }

    pub fn max_humidity(&self, stage: GrowthStage) -> f64 {
        self.max_humidity_levels.for_stage(stage)
    }

    pub fn device(&self, kind: DeviceKind) -> &DeviceConfig {
        self.device_map.get(kind)
    }
}

/// Target VPD band. Either bound may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VpdRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl VpdRange {
    /// Whether `vpd` lies within the band widened by `tolerance` on both
    /// sides. Unset bounds don't constrain.
    pub fn contains_with_tolerance(&self, vpd: f64, tolerance: f64) -> bool {
        self.min.is_none_or(|min| vpd >= min - tolerance)
            && self.max.is_none_or(|max| vpd <= max + tolerance)
    }
}

/// Humidity ceiling (%) per growth stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxHumidityLevels {
    pub propagation: f64,
    pub vegetative: f64,
    pub flowering: f64,
}

impl MaxHumidityLevels {
    pub fn for_stage(&self, stage: GrowthStage) -> f64 {
        match stage {
            GrowthStage::Propagation => self.propagation,
            GrowthStage::Vegetative => self.vegetative,
            GrowthStage::Flowering => self.flowering,
        }
    }
}

/// The physical devices the backend knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    SensorHub,
    Exhaust,
    Humidifier,
    Dehumidifier,
}

impl DeviceKind {
    pub const ALL: [Self; 4] = [
        Self::SensorHub,
        Self::Exhaust,
        Self::Humidifier,
        Self::Dehumidifier,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SensorHub => "sensor_hub",
            Self::Exhaust => "exhaust",
            Self::Humidifier => "humidifier",
            Self::Dehumidifier => "dehumidifier",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network address and hardware model for every device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMap {
    pub sensor_hub: DeviceConfig,
    pub exhaust: DeviceConfig,
    pub humidifier: DeviceConfig,
    pub dehumidifier: DeviceConfig,
}

impl DeviceMap {
    pub fn get(&self, kind: DeviceKind) -> &DeviceConfig {
        match kind {
            DeviceKind::SensorHub => &self.sensor_hub,
            DeviceKind::Exhaust => &self.exhaust,
            DeviceKind::Humidifier => &self.humidifier,
            DeviceKind::Dehumidifier => &self.dehumidifier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub ip: String,
    #[serde(rename = "type")]
    pub model: DeviceModel,
}

/// Smart-plug / hub hardware models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceModel {
    H100,
    P100,
    P115,
    #[serde(other)]
    Unknown,
}

impl DeviceModel {
    /// Wire name, as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H100 => "h100",
            Self::P100 => "p100",
            Self::P115 => "p115",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn settings_json() -> Value {
        json!({
            "KPA_TOLERANCE": 0.1,
            "LEAF_TEMP_OFFSET": -2,
            "VPD_TARGET": { "min": 0.8, "max": null },
            "VPD_MODES": {
                "propagation": [0.4, 0.8],
                "vegetative": [0.8, 1.2],
                "flowering": [1.2, 1.6]
            },
            "ACTION_MAP": { "0": "idle", "1": "exhaust_on" },
            "MAX_HUMIDITY_LEVELS": { "propagation": 80, "vegetative": 70, "flowering": 55 },
            "DEVICE_MAP": {
                "sensor_hub":   { "ip": "10.0.0.2", "type": "h100" },
                "exhaust":      { "ip": "10.0.0.3", "type": "p115" },
                "humidifier":   { "ip": "10.0.0.4", "type": "p100" },
                "dehumidifier": { "ip": "10.0.0.5", "type": "p110" }
            },
            "WS_URL": "wss://vpd.example.test/ws",
            "LOG_LEVEL": "debug"
        })
    }

    #[test]
    fn config_settings_decode_and_helpers() {
        let settings: ConfigSettings = serde_json::from_value(settings_json()).unwrap();

        assert!((settings.leaf_temp_offset + 2.0).abs() < f64::EPSILON);
        assert_eq!(settings.vpd_target.max, None);
        assert_eq!(settings.action_name(1), Some("exhaust_on"));
        assert_eq!(settings.action_name(7), None);
        assert_eq!(settings.mode_for(1.0), Some("vegetative"));
        assert_eq!(settings.mode_for(3.0), None);
        assert!((settings.max_humidity(GrowthStage::Flowering) - 55.0).abs() < f64::EPSILON);
        assert_eq!(settings.device(DeviceKind::Exhaust).model, DeviceModel::P115);
        assert_eq!(
            settings.device(DeviceKind::Dehumidifier).model,
            DeviceModel::Unknown
        );
        assert_eq!(settings.extra.get("LOG_LEVEL"), Some(&json!("debug")));
    }

    #[test]
    fn device_model_displays_wire_name() {
        for model in [
            DeviceModel::H100,
            DeviceModel::P100,
            DeviceModel::P115,
            DeviceModel::Unknown,
        ] {
            assert_eq!(json!(model), json!(model.to_string()));
        }
        assert_eq!(DeviceModel::P115.to_string(), "p115");
    }

    #[test]
    fn vpd_range_tolerance() {
        let range = VpdRange {
            min: Some(0.8),
            max: Some(1.2),
        };
        assert!(range.contains_with_tolerance(0.75, 0.1));
        assert!(!range.contains_with_tolerance(0.65, 0.1));
        assert!(range.contains_with_tolerance(1.3, 0.1));
        assert!(VpdRange::default().contains_with_tolerance(9.9, 0.0));
    }

    #[test]
    fn sensor_reading_accepts_boolean_duty_levels() {
        let reading: SensorReading = serde_json::from_value(json!({
            "temperature": 24.5,
            "humidity": 60,
            "leaf_temperature": 22.5,
            "vpd_air": 1.23,
            "vpd_leaf": 0.95,
            "exhaust": true,
            "humidifier": 0.4,
            "timestamp": "2026-10-18T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(reading.exhaust, Some(1.0));
        assert_eq!(reading.humidifier, Some(0.4));
        assert_eq!(reading.dehumidifier, None);
        assert!(reading.extra.contains_key("timestamp"));
    }

    #[test]
    fn payload_rejects_non_objects() {
        for bad in [json!(null), json!([1, 2]), json!("hot"), json!(42)] {
            let err = SensorPayload::try_from(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidPayload(_)));
        }
        assert!(SensorPayload::try_from(json!({})).is_ok());
    }

    #[test]
    fn anomaly_request_zero_fills_missing_fields() {
        let payload = SensorPayload::try_from(json!({
            "temperature": 26.0,
            "humidity": "n/a",
            "exhaust": true
        }))
        .unwrap();

        let req = AnomalyRequest::from(&payload);
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({
                "temperature": 26.0,
                "leaf_temperature": 0.0,
                "humidity": 0.0,
                "vpd_air": 0.0,
                "vpd_leaf": 0.0,
                "exhaust": 1.0,
                "humidifier": 0.0,
                "dehumidifier": 0.0
            })
        );
    }

    #[test]
    fn predicted_states_default_false() {
        let states = PredictedStates::from_object(
            json!({ "exhaust": true, "humidifier": "yes" })
                .as_object()
                .unwrap(),
        );
        assert_eq!(
            states,
            PredictedStates {
                exhaust: true,
                humidifier: false,
                dehumidifier: false,
            }
        );
    }

    #[test]
    fn device_names_are_single_segments() {
        assert!(DeviceName::new("exhaust").is_ok());
        assert!(DeviceName::new("sensor_hub-2").is_ok());
        assert!(DeviceName::new("").is_err());
        assert!(DeviceName::new("exhaust/on").is_err());
        assert!(DeviceName::new("fan?x=1").is_err());
    }

    #[test]
    fn power_state_parsing() {
        assert_eq!("ON".parse::<PowerState>().unwrap(), PowerState::On);
        assert_eq!("false".parse::<PowerState>().unwrap(), PowerState::Off);
        assert!("maybe".parse::<PowerState>().is_err());
        assert_eq!(PowerState::from(true).to_string(), "on");
    }
}
