use tracing::debug;

use crate::client::VpdClient;
use crate::error::Error;
use crate::models::SensorReading;

impl VpdClient {
    /// Latest reading from the sensor hub.
    ///
    /// `GET /sensor_data`
    pub async fn get_sensor_data(&self) -> Result<SensorReading, Error> {
        debug!("fetching sensor data");
        self.get_json("sensor_data").await
    }
}
