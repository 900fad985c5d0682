use std::fmt;

use serde::{Deserialize, Serialize};

/// Tokyo Station, the initial center of the itinerary map.
pub const TOKYO_STATION: Coordinates = Coordinates {
    latitude: 35.681236,
    longitude: 139.767125,
};

/// Osaka Umeda, used when the device position is unavailable.
pub const OSAKA_UMEDA: Coordinates = Coordinates {
    latitude: 34.702485,
    longitude: 135.495951,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Leaflet expects `[lat, lng]` pairs.
    pub fn as_lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat:{}, lng:{}", self.latitude, self.longitude)
    }
}
