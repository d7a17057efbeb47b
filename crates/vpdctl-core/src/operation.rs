// ── Backend operations ──
//
// One variant per client call, used to label logs and errors.

use strum::{Display, EnumIter};

/// A single backend call made through the [`Dashboard`](crate::Dashboard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
    ToggleDevice,
    GetSensorData,
    GetDeviceStatus,
    GetDeviceInfo,
    GetExhaustInfo,
    GetHumidifierInfo,
    GetDehumidifierInfo,
    SetVpdTarget,
    GetVpdTarget,
    DetectAnomaly,
    GetOptimizedControl,
    GetPredictedAction,
    GetPredictedStates,
    GetPredictionData,
    FetchConfigSettings,
}

impl Operation {
    /// Whether this reads one of the device info endpoints.
    pub fn is_info(self) -> bool {
        matches!(
            self,
            Self::GetDeviceInfo
                | Self::GetExhaustInfo
                | Self::GetHumidifierInfo
                | Self::GetDehumidifierInfo
        )
    }

    /// User-facing summary of what failed. The info endpoints share one.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::ToggleDevice => "Failed to toggle device",
            Self::GetSensorData => "Failed to retrieve sensor data",
            Self::GetDeviceStatus => "Failed to retrieve device status",
            Self::GetDeviceInfo
            | Self::GetExhaustInfo
            | Self::GetHumidifierInfo
            | Self::GetDehumidifierInfo => "Failed to retrieve info data",
            Self::SetVpdTarget => "Failed to set VPD target",
            Self::GetVpdTarget => "Failed to retrieve VPD target",
            Self::DetectAnomaly => "Failed to run anomaly detection",
            Self::GetOptimizedControl => "Failed to get optimized control",
            Self::GetPredictedAction => "Failed to get predicted action",
            Self::GetPredictedStates => "Failed to get predicted states",
            Self::GetPredictionData => "Failed to retrieve prediction data",
            Self::FetchConfigSettings => "Failed to fetch config settings",
        }
    }
}
