#![allow(clippy::unwrap_used)]
// Integration tests for `Dashboard` using wiremock.

use std::time::Duration;

use futures_util::future::join_all;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vpdctl_core::{
    ApplyOutcome, CoreError, Dashboard, DashboardConfig, DeviceName, Operation, PowerState,
    SensorPayload,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Dashboard) {
    let server = MockServer::start().await;
    let config = DashboardConfig::new(Url::parse(&server.uri()).unwrap());
    let dashboard = Dashboard::new(config).unwrap();
    (server, dashboard)
}

fn settings_json(tolerance: f64) -> serde_json::Value {
    json!({
        "KPA_TOLERANCE": tolerance,
        "LEAF_TEMP_OFFSET": -1.5,
        "VPD_TARGET": { "min": 0.8, "max": 1.2 },
        "VPD_MODES": { "vegetative": [0.8, 1.2] },
        "ACTION_MAP": { "0": "hold", "1": "exhaust_on" },
        "MAX_HUMIDITY_LEVELS": { "propagation": 80.0, "vegetative": 70.0, "flowering": 60.0 },
        "DEVICE_MAP": {
            "sensor_hub":   { "ip": "10.0.0.2", "type": "h100" },
            "exhaust":      { "ip": "10.0.0.3", "type": "p100" },
            "humidifier":   { "ip": "10.0.0.4", "type": "p115" },
            "dehumidifier": { "ip": "10.0.0.5", "type": "p100" }
        },
        "WS_URL": "wss://vpd.example/ws"
    })
}

// ── Error surface ───────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_failure_carries_operation() {
    let (server, dashboard) = setup().await;

    Mock::given(method("POST"))
        .and(path("/humidifier/off"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let device = DeviceName::new("humidifier").unwrap();
    let err = dashboard
        .toggle_device(&device, PowerState::Off)
        .await
        .unwrap_err();

    assert_eq!(err.operation(), Some(Operation::ToggleDevice));
    assert_eq!(err.failure_message(), "Failed to toggle device");
    assert!(matches!(err, CoreError::Rejected { status: 500, .. }));
}

#[tokio::test]
async fn test_session_cookie_sent_on_get_and_post() {
    let server = MockServer::start().await;
    let mut config = DashboardConfig::new(Url::parse(&server.uri()).unwrap());
    config.session_cookie = Some(SecretString::from("session=grow-42"));
    let dashboard = Dashboard::new(config).unwrap();

    Mock::given(method("GET"))
        .and(path("/device_status"))
        .and(header("cookie", "session=grow-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "exhaust": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/exhaust/on"))
        .and(header("cookie", "session=grow-42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let status = dashboard.get_device_status().await.unwrap();
    assert_eq!(status, json!({ "exhaust": true }));

    let device = DeviceName::new("exhaust").unwrap();
    dashboard.toggle_device(&device, PowerState::On).await.unwrap();
}

#[tokio::test]
async fn test_info_failures_share_one_message() {
    let (server, dashboard) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    for err in [
        dashboard.get_device_info().await.unwrap_err(),
        dashboard.get_exhaust_info().await.unwrap_err(),
        dashboard.get_humidifier_info().await.unwrap_err(),
        dashboard.get_dehumidifier_info().await.unwrap_err(),
    ] {
        assert_eq!(err.failure_message(), "Failed to retrieve info data");
    }
}

#[tokio::test]
async fn test_set_vpd_target_failure_propagates() {
    let (server, dashboard) = setup().await;

    Mock::given(method("POST"))
        .and(path("/set_vpd_target"))
        .respond_with(ResponseTemplate::new(422).set_body_string("unknown stage"))
        .mount(&server)
        .await;

    let err = dashboard.set_vpd_target("late_flower").await.unwrap_err();
    match err {
        CoreError::Rejected {
            operation, message, ..
        } => {
            assert_eq!(operation, Operation::SetVpdTarget);
            assert_eq!(message, "unknown stage");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_backend() {
    let config = DashboardConfig::new(Url::parse("http://127.0.0.1:9").unwrap());
    let dashboard = Dashboard::new(config).unwrap();

    let err = dashboard.get_sensor_data().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Unreachable {
            operation: Operation::GetSensorData,
            ..
        }
    ));
}

#[tokio::test]
async fn test_predictions_pass_through() {
    let (server, dashboard) = setup().await;

    Mock::given(method("POST"))
        .and(path("/predict_action"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "predicted_action": "fan_on" })))
        .mount(&server)
        .await;

    let payload = SensorPayload::try_from(json!({ "temperature": 27.0 })).unwrap();
    assert_eq!(
        dashboard.get_predicted_action(&payload).await.unwrap(),
        "fan_on"
    );
}

// ── Config store ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_config_populates_store() {
    let (server, dashboard) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json(0.1)))
        .mount(&server)
        .await;

    assert!(dashboard.store().snapshot().is_none());

    let outcome = dashboard.fetch_config_settings().await.unwrap();
    assert!(outcome.is_applied());

    let snap = dashboard.store().snapshot().unwrap();
    assert_eq!(snap.settings.action_name(1), Some("exhaust_on"));
    assert_eq!(snap.settings.ws_url, "wss://vpd.example/ws");
}

#[tokio::test]
async fn test_failed_fetch_leaves_store_empty() {
    let (server, dashboard) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config-settings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = dashboard.fetch_config_settings().await.unwrap_err();
    assert_eq!(err.failure_message(), "Failed to fetch config settings");
    assert!(dashboard.store().snapshot().is_none());
}

#[tokio::test]
async fn test_failed_fetch_keeps_previous_snapshot() {
    let (server, dashboard) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json(0.1)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/config-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    dashboard.fetch_config_settings().await.unwrap();
    let before = dashboard.store().snapshot().unwrap();

    let err = dashboard.fetch_config_settings().await.unwrap_err();
    assert!(matches!(err, CoreError::MalformedResponse { .. }));

    let after = dashboard.store().snapshot().unwrap();
    assert_eq!(after.version, before.version);
    assert_eq!(after.settings, before.settings);
}

#[tokio::test]
async fn test_slow_older_fetch_does_not_overwrite_newer() {
    let (server, dashboard) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config-settings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(settings_json(0.1))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/config-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json(0.3)))
        .mount(&server)
        .await;

    let slow_dashboard = dashboard.clone();
    let slow = tokio::spawn(async move { slow_dashboard.fetch_config_settings().await });

    // Only start the second fetch once the first one is in flight.
    while server.received_requests().await.unwrap().is_empty() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let fast = dashboard.fetch_config_settings().await.unwrap();
    assert!(fast.is_applied());

    let slow = slow.await.unwrap().unwrap();
    assert!(matches!(slow, ApplyOutcome::Stale { .. }));

    let snap = dashboard.store().snapshot().unwrap();
    assert!((snap.settings.kpa_tolerance - 0.3).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_concurrent_fetches_settle_on_latest_ticket() {
    let (server, dashboard) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings_json(0.2)))
        .expect(4)
        .mount(&server)
        .await;

    let outcomes = join_all((0..4).map(|_| dashboard.fetch_config_settings())).await;
    assert!(outcomes.iter().all(Result::is_ok));

    assert_eq!(dashboard.store().version(), Some(4));
}
