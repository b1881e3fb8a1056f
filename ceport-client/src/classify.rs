//! Threshold rules turning raw sensor values into display categories.
//!
//! Every rule treats a missing value as `0` and truncates the raw value toward
//! zero before comparing, the same integer view the backend's sensors report.
//! Thresholds are inclusive on the lower bound and exclusive on the upper one.

use std::fmt::{self, Display, Formatter};

const GREEN: &str = "#A8FBCE";
const AMBER: &str = "#FFE08A";
const RED: &str = "#F28B82";
const DARK: &str = "#3F504A";

fn raw(value: Option<f64>) -> i64 {
    value.unwrap_or(0.0).trunc() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AirQuality {
    Good,
    Moderate,
    Bad,
}

impl AirQuality {
    pub fn color(&self) -> &'static str {
        match self {
            AirQuality::Good => GREEN,
            AirQuality::Moderate => AMBER,
            AirQuality::Bad => RED,
        }
    }
}

impl Display for AirQuality {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AirQuality::Good => write!(f, "Good"),
            AirQuality::Moderate => write!(f, "Moderate"),
            AirQuality::Bad => write!(f, "Bad"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoiseLevel {
    Low,
    Moderate,
    High,
}

impl NoiseLevel {
    pub fn color(&self) -> &'static str {
        match self {
            NoiseLevel::Low => GREEN,
            NoiseLevel::Moderate => AMBER,
            NoiseLevel::High => RED,
        }
    }
}

impl Display for NoiseLevel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            NoiseLevel::Low => write!(f, "Low"),
            NoiseLevel::Moderate => write!(f, "Moderate"),
            NoiseLevel::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransitLevel {
    Low,
    Moderate,
    High,
}

impl TransitLevel {
    pub fn color(&self) -> &'static str {
        match self {
            TransitLevel::Low => GREEN,
            TransitLevel::Moderate => AMBER,
            TransitLevel::High => RED,
        }
    }
}

impl Display for TransitLevel {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TransitLevel::Low => write!(f, "Low"),
            TransitLevel::Moderate => write!(f, "Moderate"),
            TransitLevel::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpotOccupancy {
    Free,
    Occupied,
}

impl SpotOccupancy {
    pub fn color(&self) -> &'static str {
        match self {
            SpotOccupancy::Free => GREEN,
            SpotOccupancy::Occupied => DARK,
        }
    }
}

impl Display for SpotOccupancy {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SpotOccupancy::Free => write!(f, "Free"),
            SpotOccupancy::Occupied => write!(f, "Occupied"),
        }
    }
}

/// Gas concentration: below 500 is good, 1000 and above is bad.
pub fn classify_air_quality(gas: Option<f64>) -> AirQuality {
    match raw(gas) {
        value if value < 500 => AirQuality::Good,
        value if value < 1000 => AirQuality::Moderate,
        _ => AirQuality::Bad,
    }
}

/// Sound level: below 40 is low, 70 and above is high.
pub fn classify_noise(level: Option<f64>) -> NoiseLevel {
    match raw(level) {
        value if value < 40 => NoiseLevel::Low,
        value if value < 70 => NoiseLevel::Moderate,
        _ => NoiseLevel::High,
    }
}

/// Counts a spot toward transit only when its raw value is exactly `1`.
pub fn is_transit_occupied(ultrasonic: Option<f64>) -> bool {
    raw(ultrasonic) == 1
}

pub fn classify_transit(spot0_occupied: bool, spot1_occupied: bool) -> TransitLevel {
    match (spot0_occupied, spot1_occupied) {
        (false, false) => TransitLevel::Low,
        (true, true) => TransitLevel::High,
        _ => TransitLevel::Moderate,
    }
}

/// A spot is free only when its raw value is exactly `0`.
///
/// Unlike [`is_transit_occupied`], a raw `2` shows the spot as occupied yet
/// does not count toward transit.
pub fn classify_spot_occupancy(ultrasonic: Option<f64>) -> SpotOccupancy {
    if raw(ultrasonic) == 0 {
        SpotOccupancy::Free
    } else {
        SpotOccupancy::Occupied
    }
}
