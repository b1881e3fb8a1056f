use std::sync::Arc;

use async_trait::async_trait;
use ceport_api::models::SensorReading;

use super::{PLACEHOLDER, Screen};
use crate::classify::*;
use crate::client::SensorBackend;
use crate::error::{Error, Result};

/// Environment overview built from the latest reading.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub temperature: String,
    pub humidity: String,
    pub air_quality: Option<AirQuality>,
    pub noise: Option<NoiseLevel>,
    pub transit: Option<TransitLevel>,
    pub spots: [Option<SpotOccupancy>; 2],
}

impl DashboardSnapshot {
    pub fn placeholder() -> Self {
        Self {
            temperature: PLACEHOLDER.to_string(),
            humidity: PLACEHOLDER.to_string(),
            air_quality: None,
            noise: None,
            transit: None,
            spots: [None, None],
        }
    }

    pub fn from_reading(reading: &SensorReading) -> Self {
        Self {
            temperature: format!("{:.1}°C", reading.tem01.unwrap_or(0.0)),
            humidity: format!("{:.0}%", reading.hum01.unwrap_or(0.0)),
            air_quality: Some(classify_air_quality(reading.gas01)),
            noise: Some(classify_noise(reading.son01)),
            transit: Some(classify_transit(
                is_transit_occupied(reading.ult01),
                is_transit_occupied(reading.ult02),
            )),
            spots: [
                Some(classify_spot_occupancy(reading.ult01)),
                Some(classify_spot_occupancy(reading.ult02)),
            ],
        }
    }
}

pub struct DashboardScreen {
    backend: Arc<dyn SensorBackend>,
}

impl DashboardScreen {
    pub fn new(backend: Arc<dyn SensorBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Screen for DashboardScreen {
    type Snapshot = DashboardSnapshot;

    const NAME: &'static str = "dashboard";

    fn initial(&self) -> DashboardSnapshot {
        DashboardSnapshot::placeholder()
    }

    async fn fetch(&self, _previous: DashboardSnapshot) -> Result<DashboardSnapshot> {
        let reading = self.backend.last_sensor_reading().await?;

        Ok(DashboardSnapshot::from_reading(&reading))
    }

    fn on_error(&self, _previous: &DashboardSnapshot, _error: &Error) -> DashboardSnapshot {
        DashboardSnapshot::placeholder()
    }
}
