// VPD target endpoints
//
// The target is a growth-stage name; the backend maps it to a kPa band.

use serde_json::json;
use tracing::debug;

use crate::client::VpdClient;
use crate::error::Error;
use crate::models::VpdTarget;

impl VpdClient {
    /// Select the growth-stage VPD target. The stage is not validated
    /// locally.
    ///
    /// `POST /set_vpd_target` with `{"stage": "..."}`
    pub async fn set_vpd_target(&self, stage: &str) -> Result<(), Error> {
        debug!(stage, "setting VPD target");
        self.post_discard("set_vpd_target", &json!({ "stage": stage }))
            .await
    }

    /// `GET /get_vpd_target`
    pub async fn get_vpd_target(&self) -> Result<VpdTarget, Error> {
        debug!("fetching VPD target");
        self.get_json("get_vpd_target").await
    }
}
