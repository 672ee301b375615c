use serde::{Deserialize, Serialize};

/// Default reference point (Taipei) used until a client supplies its own
pub const DEFAULT_LAT: f64 = 25.1;
pub const DEFAULT_LNG: f64 = 121.55;

/// Rough conversion between kilometres and degrees of arc
pub const KM_PER_DEGREE: f64 = 111.0;

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Flat-earth distance in degrees; only meaningful over a few kilometres
    pub fn degree_distance(&self, lat: f64, lng: f64) -> f64 {
        let dlat = lat - self.lat;
        let dlng = lng - self.lng;
        (dlat * dlat + dlng * dlng).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_LAT, DEFAULT_LNG)
    }
}
