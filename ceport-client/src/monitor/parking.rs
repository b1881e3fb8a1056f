use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use ceport_api::models::SensorName;

use super::Screen;
use crate::classify::{SpotOccupancy, classify_spot_occupancy};
use crate::client::SensorBackend;
use crate::error::{Error, Result};

/// A parking space watched by one ultrasonic sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spot {
    Zero,
    One,
}

impl Spot {
    pub const ALL: [Spot; 2] = [Spot::Zero, Spot::One];

    pub fn index(&self) -> usize {
        match self {
            Spot::Zero => 0,
            Spot::One => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Spot::ALL.get(index).copied()
    }

    pub fn sensor(&self) -> SensorName {
        match self {
            Spot::Zero => SensorName::Ult01,
            Spot::One => SensorName::Ult02,
        }
    }
}

impl Display for Spot {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpotIndicator {
    /// Not checked yet
    Unknown,
    /// Sensor switched off, occupancy not read
    Inactive,
    Free,
    Occupied,
}

impl SpotIndicator {
    pub fn color(&self) -> &'static str {
        match self {
            SpotIndicator::Unknown | SpotIndicator::Inactive => "#F6F6F6",
            SpotIndicator::Free => SpotOccupancy::Free.color(),
            SpotIndicator::Occupied => SpotOccupancy::Occupied.color(),
        }
    }
}

impl From<SpotOccupancy> for SpotIndicator {
    fn from(value: SpotOccupancy) -> Self {
        match value {
            SpotOccupancy::Free => SpotIndicator::Free,
            SpotOccupancy::Occupied => SpotIndicator::Occupied,
        }
    }
}

impl Display for SpotIndicator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SpotIndicator::Unknown => write!(f, "--"),
            SpotIndicator::Inactive => write!(f, "Inactive"),
            SpotIndicator::Free => write!(f, "Free"),
            SpotIndicator::Occupied => write!(f, "Occupied"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkingSnapshot {
    pub spots: [SpotIndicator; 2],
}

impl ParkingSnapshot {
    pub fn spot(&self, spot: Spot) -> SpotIndicator {
        self.spots[spot.index()]
    }
}

impl Default for ParkingSnapshot {
    fn default() -> Self {
        Self {
            spots: [SpotIndicator::Unknown; 2],
        }
    }
}

pub struct ParkingScreen {
    backend: Arc<dyn SensorBackend>,
}

impl ParkingScreen {
    pub fn new(backend: Arc<dyn SensorBackend>) -> Self {
        Self { backend }
    }

    /// Reads occupancy only when the spot's sensor is switched on.
    async fn check_spot(&self, spot: Spot) -> Result<SpotIndicator> {
        let status = self.backend.get_sensor_status(spot.sensor()).await?;

        if !status.is_active {
            return Ok(SpotIndicator::Inactive);
        }

        let reading = self.backend.last_sensor_reading().await?;

        Ok(classify_spot_occupancy(reading.value(spot.sensor())).into())
    }
}

#[async_trait]
impl Screen for ParkingScreen {
    type Snapshot = ParkingSnapshot;

    const NAME: &'static str = "parking";

    fn initial(&self) -> ParkingSnapshot {
        ParkingSnapshot::default()
    }

    async fn fetch(&self, previous: ParkingSnapshot) -> Result<ParkingSnapshot> {
        let (zero, one) = tokio::join!(self.check_spot(Spot::Zero), self.check_spot(Spot::One));

        let mut snapshot = previous;
        let mut failures = Vec::new();

        for (spot, result) in [(Spot::Zero, zero), (Spot::One, one)] {
            match result {
                Ok(indicator) => snapshot.spots[spot.index()] = indicator,
                Err(e) => {
                    tracing::warn!("spot {} check failed: {}", spot, e);
                    failures.push(e);
                }
            }
        }

        if failures.len() == Spot::ALL.len() {
            return Err(failures.swap_remove(0));
        }

        Ok(snapshot)
    }

    fn on_error(&self, previous: &ParkingSnapshot, _error: &Error) -> ParkingSnapshot {
        previous.clone()
    }
}
