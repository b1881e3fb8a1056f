use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Sensors known to the backend. These are the only valid keys of the
/// `/sensor-status/{name}` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorName {
    /// Gas concentration
    Gas01,
    /// Relative humidity
    Hum01,
    /// Motion detector
    Pir01,
    /// Barrier servo position
    Ser01,
    /// Sound level
    Son01,
    /// Temperature
    Tem01,
    /// Ultrasonic distance, spot 0
    Ult01,
    /// Ultrasonic distance, spot 1
    Ult02,
    /// NFC card reader
    Nfc01,
}

impl SensorName {
    pub const ALL: [SensorName; 9] = [
        SensorName::Gas01,
        SensorName::Hum01,
        SensorName::Pir01,
        SensorName::Ser01,
        SensorName::Son01,
        SensorName::Tem01,
        SensorName::Ult01,
        SensorName::Ult02,
        SensorName::Nfc01,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorName::Gas01 => "Gas01",
            SensorName::Hum01 => "Hum01",
            SensorName::Pir01 => "Pir01",
            SensorName::Ser01 => "Ser01",
            SensorName::Son01 => "Son01",
            SensorName::Tem01 => "Tem01",
            SensorName::Ult01 => "Ult01",
            SensorName::Ult02 => "Ult02",
            SensorName::Nfc01 => "Nfc01",
        }
    }
}

impl Display for SensorName {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSensor(pub String);

impl Display for UnknownSensor {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "unknown sensor: {}", self.0)
    }
}

impl std::error::Error for UnknownSensor {}

impl FromStr for SensorName {
    type Err = UnknownSensor;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SensorName::ALL
            .into_iter()
            .find(|name| name.as_str() == value)
            .ok_or_else(|| UnknownSensor(value.to_string()))
    }
}

/// Enabled state of a single sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorStatus {
    pub name: SensorName,
    pub is_active: bool,
}

/// One timestamped snapshot of every sensor value. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    /// Gas concentration in ppm
    #[serde(rename = "Gas01", default)]
    pub gas01: Option<f64>,
    /// Last scanned card UID
    #[serde(rename = "Nfc01", default)]
    pub nfc01: Option<String>,
    /// Motion flag (0 or 1)
    #[serde(rename = "Pir01", default)]
    pub pir01: Option<f64>,
    /// Relative humidity percentage
    #[serde(rename = "Hum01", default)]
    pub hum01: Option<f64>,
    /// Servo position
    #[serde(rename = "Ser01", default)]
    pub ser01: Option<f64>,
    /// Sound level in dB
    #[serde(rename = "Son01", default)]
    pub son01: Option<f64>,
    /// Temperature in Celsius
    #[serde(rename = "Tem01", default)]
    pub tem01: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Ultrasonic occupancy, spot 0
    #[serde(rename = "Ult01", default)]
    pub ult01: Option<f64>,
    /// Ultrasonic occupancy, spot 1
    #[serde(rename = "Ult02", default)]
    pub ult02: Option<f64>,
}

impl SensorReading {
    /// Raw value reported by the given sensor. `Nfc01` carries text, not a number.
    pub fn value(&self, name: SensorName) -> Option<f64> {
        match name {
            SensorName::Gas01 => self.gas01,
            SensorName::Hum01 => self.hum01,
            SensorName::Pir01 => self.pir01,
            SensorName::Ser01 => self.ser01,
            SensorName::Son01 => self.son01,
            SensorName::Tem01 => self.tem01,
            SensorName::Ult01 => self.ult01,
            SensorName::Ult02 => self.ult02,
            SensorName::Nfc01 => None,
        }
    }

    pub fn recorded_at(&self) -> Option<OffsetDateTime> {
        self.timestamp
            .as_deref()
            .and_then(|timestamp| OffsetDateTime::parse(timestamp, &Rfc3339).ok())
    }
}
