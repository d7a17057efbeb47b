use tracing::debug;

use crate::client::VpdClient;
use crate::error::Error;
use crate::models::ConfigSettings;

impl VpdClient {
    /// Backend configuration: tolerances, VPD bands, device map.
    ///
    /// `GET /config-settings`
    pub async fn get_config_settings(&self) -> Result<ConfigSettings, Error> {
        debug!("fetching config settings");
        self.get_json("config-settings").await
    }
}
