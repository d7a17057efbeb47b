// Model endpoints
//
// Anomaly detection, the optimizer, and the device-state predictor.
// These are the only endpoints whose responses are shape-checked beyond
// plain deserialization: the backend's model server has answered with
// bare strings and arrays in the past.

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::VpdClient;
use crate::error::Error;
use crate::models::{AnomalyRequest, AnomalyVerdict, PredictedStates, SensorPayload, json_kind};

/// Returned by `get_predicted_action` when the response names no action.
pub const UNKNOWN_ACTION: &str = "unknown_action";

/// Response field names for the predicted action, newest first.
const ACTION_FIELDS: [&str; 2] = ["recommended_action", "predicted_action"];

impl VpdClient {
    /// Run anomaly detection on a reading.
    ///
    /// `POST /detect_anomaly`. The body always carries the eight numeric
    /// fields the model expects, zero-filled where `payload` lacks them.
    pub async fn detect_anomaly(&self, payload: &SensorPayload) -> Result<AnomalyVerdict, Error> {
        let body = AnomalyRequest::from(payload);
        debug!(?body, "detecting anomalies");
        self.post_json("detect_anomaly", &body).await
    }

    /// Ask the optimizer for the best next action.
    ///
    /// `POST /optimize_control` (or `/adjust_conditions`, see
    /// [`OptimizeEndpoint`](crate::OptimizeEndpoint)); returns `best_action`.
    pub async fn get_optimized_control(&self, payload: &SensorPayload) -> Result<String, Error> {
        let path = self.optimize_endpoint().path();
        debug!(path, "requesting optimized control");
        let body = expect_object(self.post_json(path, payload).await?)?;
        match body.get("best_action") {
            Some(Value::String(action)) => Ok(action.clone()),
            Some(other) => Err(Error::UnexpectedShape(format!(
                "best_action should be a string, got {}",
                json_kind(other)
            ))),
            None => Err(Error::UnexpectedShape("response has no best_action".into())),
        }
    }

    /// Predicted next action.
    ///
    /// `POST /predict_action`. Reads `recommended_action`, then
    /// `predicted_action`; falls back to [`UNKNOWN_ACTION`] when neither is
    /// a string.
    pub async fn get_predicted_action(&self, payload: &SensorPayload) -> Result<String, Error> {
        debug!("requesting predicted action");
        let body = expect_object(self.post_json("predict_action", payload).await?)?;
        let action = ACTION_FIELDS
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str))
            .unwrap_or(UNKNOWN_ACTION);
        Ok(action.to_owned())
    }

    /// Predicted on/off state for each device.
    ///
    /// `POST /predict`. Flags missing from the response are `false`.
    pub async fn get_predicted_states(
        &self,
        payload: &SensorPayload,
    ) -> Result<PredictedStates, Error> {
        debug!("requesting predicted device states");
        let body = expect_object(self.post_json("predict", payload).await?)?;
        Ok(PredictedStates::from_object(&body))
    }

    /// Raw prediction history / model data.
    ///
    /// `GET /get_prediction_data`
    pub async fn get_prediction_data(&self) -> Result<Value, Error> {
        debug!("fetching prediction data");
        self.get_json("get_prediction_data").await
    }
}

fn expect_object(value: Value) -> Result<Map<String, Value>, Error> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::UnexpectedShape(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}
