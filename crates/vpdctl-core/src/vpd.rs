// ── VPD math ──
//
// Local vapor-pressure-deficit calculations, used to sanity-check the
// backend's reported values against its own target and tolerance.
// Temperatures in °C, relative humidity in %, pressures in kPa.

use serde::Serialize;

use vpdctl_api::{ConfigSettings, GrowthStage, SensorReading, VpdRange};

/// Saturation vapor pressure over water (Tetens).
pub fn saturation_vapor_pressure(temp_c: f64) -> f64 {
    0.6108 * ((17.27 * temp_c) / (temp_c + 237.3)).exp()
}

/// Air VPD: how far the air is from saturation at its own temperature.
pub fn air_vpd(temp_c: f64, humidity_pct: f64) -> f64 {
    saturation_vapor_pressure(temp_c) * (1.0 - clamp_humidity(humidity_pct) / 100.0)
}

/// Leaf VPD: saturation at leaf temperature minus the actual vapor
/// pressure of the surrounding air. Can go negative when the leaf is
/// colder than the air's dew point.
pub fn leaf_vpd(air_temp_c: f64, leaf_temp_c: f64, humidity_pct: f64) -> f64 {
    let actual = saturation_vapor_pressure(air_temp_c) * clamp_humidity(humidity_pct) / 100.0;
    saturation_vapor_pressure(leaf_temp_c) - actual
}

/// Estimated leaf temperature from the configured offset (signed,
/// usually negative).
pub fn leaf_temperature(air_temp_c: f64, offset_c: f64) -> f64 {
    air_temp_c + offset_c
}

/// Whether `actual` is inside `target` widened by `tolerance` kPa.
pub fn within_tolerance(actual: f64, target: &VpdRange, tolerance: f64) -> bool {
    target.contains_with_tolerance(actual, tolerance)
}

fn clamp_humidity(humidity_pct: f64) -> f64 {
    humidity_pct.clamp(0.0, 100.0)
}

/// A reading checked against the backend's target band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VpdCheck {
    /// Air VPD recomputed from temperature and humidity.
    pub computed_air: f64,
    /// Leaf VPD recomputed from the measured leaf temperature.
    pub computed_leaf: f64,
    /// Leaf VPD using `LEAF_TEMP_OFFSET` instead of the leaf sensor.
    pub estimated_leaf: f64,
    pub reported_leaf: f64,
    /// Named VPD mode the reported leaf VPD falls into.
    pub mode: Option<String>,
    pub within_target: bool,
    /// Whether humidity exceeds the ceiling for the active stage.
    /// `None` when no stage is given or it is not a known growth stage.
    pub humidity_over_limit: Option<bool>,
}

impl VpdCheck {
    /// Evaluate `reading` against `settings`. `stage` is the active
    /// growth-stage target name, if known.
    pub fn evaluate(reading: &SensorReading, settings: &ConfigSettings, stage: Option<&str>) -> Self {
        let estimated_leaf_temp = leaf_temperature(reading.temperature, settings.leaf_temp_offset);
        let humidity_over_limit = stage
            .and_then(|s| s.parse::<GrowthStage>().ok())
            .map(|stage| reading.humidity > settings.max_humidity(stage));

        Self {
            computed_air: air_vpd(reading.temperature, reading.humidity),
            computed_leaf: leaf_vpd(reading.temperature, reading.leaf_temperature, reading.humidity),
            estimated_leaf: leaf_vpd(reading.temperature, estimated_leaf_temp, reading.humidity),
            reported_leaf: reading.vpd_leaf,
            mode: settings.mode_for(reading.vpd_leaf).map(str::to_owned),
            within_target: within_tolerance(
                reading.vpd_leaf,
                &settings.vpd_target,
                settings.kpa_tolerance,
            ),
            humidity_over_limit,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.005
    }

    #[test]
    fn saturation_pressure_reference_points() {
        assert!(close(saturation_vapor_pressure(0.0), 0.611));
        assert!(close(saturation_vapor_pressure(20.0), 2.338));
        assert!(close(saturation_vapor_pressure(25.0), 3.168));
    }

    #[test]
    fn air_vpd_edges() {
        assert!(close(air_vpd(25.0, 100.0), 0.0));
        assert!(close(air_vpd(25.0, 60.0), 1.267));
        // Out-of-range humidity is clamped rather than producing nonsense.
        assert!(close(air_vpd(25.0, 130.0), 0.0));
        assert!(close(air_vpd(25.0, -5.0), saturation_vapor_pressure(25.0)));
    }

    #[test]
    fn leaf_vpd_cooler_leaf_lowers_deficit() {
        let air = air_vpd(26.0, 55.0);
        let leaf = leaf_vpd(26.0, 24.0, 55.0);
        assert!(leaf < air);
        assert!(close(leaf_vpd(26.0, 26.0, 55.0), air));
    }

    #[test]
    fn tolerance_widens_the_band() {
        let band = VpdRange {
            min: Some(0.8),
            max: Some(1.2),
        };
        assert!(within_tolerance(1.25, &band, 0.1));
        assert!(!within_tolerance(1.35, &band, 0.1));
        assert!(within_tolerance(5.0, &VpdRange::default(), 0.0));
    }

    #[test]
    fn check_against_settings() {
        let settings: ConfigSettings = serde_json::from_value(json!({
            "KPA_TOLERANCE": 0.1,
            "LEAF_TEMP_OFFSET": -2.0,
            "VPD_TARGET": { "min": 0.8, "max": 1.2 },
            "VPD_MODES": { "vegetative": [0.8, 1.2], "flowering": [1.2, 1.6] },
            "ACTION_MAP": {},
            "MAX_HUMIDITY_LEVELS": { "propagation": 80, "vegetative": 65, "flowering": 55 },
            "DEVICE_MAP": {
                "sensor_hub":   { "ip": "10.0.0.2", "type": "h100" },
                "exhaust":      { "ip": "10.0.0.3", "type": "p100" },
                "humidifier":   { "ip": "10.0.0.4", "type": "p100" },
                "dehumidifier": { "ip": "10.0.0.5", "type": "p100" }
            },
            "WS_URL": "ws://localhost/ws"
        }))
        .unwrap();

        let reading: SensorReading = serde_json::from_value(json!({
            "temperature": 26.0,
            "humidity": 68.0,
            "leaf_temperature": 24.0,
            "vpd_air": 1.08,
            "vpd_leaf": 0.72,
        }))
        .unwrap();

        let check = VpdCheck::evaluate(&reading, &settings, Some("vegetative"));

        assert!(close(check.computed_air, air_vpd(26.0, 68.0)));
        assert!(close(check.estimated_leaf, check.computed_leaf));
        assert_eq!(check.mode, None);
        assert!(check.within_target);
        assert_eq!(check.humidity_over_limit, Some(true));

        let propagation = VpdCheck::evaluate(&reading, &settings, Some("propagation"));
        assert_eq!(propagation.humidity_over_limit, Some(false));

        let unknown_stage = VpdCheck::evaluate(&reading, &settings, Some("late_flower"));
        assert_eq!(unknown_stage.humidity_over_limit, None);
        let no_stage = VpdCheck::evaluate(&reading, &settings, None);
        assert_eq!(no_stage.humidity_over_limit, None);
    }
}
