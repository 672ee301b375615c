use super::{normalize_heading, Vehicle};
use crate::location::Location;
use serde::{Deserialize, Serialize};

/// Roughly 10 km expressed in degrees
pub const DEFAULT_MAX_DISTANCE_DEG: f64 = 0.09;

/// Roughly 11 km expressed in degrees
pub const DEFAULT_WINDOW_DEG: f64 = 0.1;

// Absorbs float error from `reference ± window` when checking containment
const TOLERANCE_DEG: f64 = 1e-9;

/// How a vehicle is kept close to the reference location.
///
/// Exactly one policy is active per process.
///
/// ```toml
/// [simulation.boundary]
/// policy = "clamp"
/// window_deg = 0.1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Past the radial cutoff the vehicle turns around and holds position for the tick
    Reverse {
        #[serde(default = "default_max_distance_deg")]
        max_distance_deg: f64,
    },
    /// Latitude and longitude are clamped independently into a square window
    Clamp {
        #[serde(default = "default_window_deg")]
        window_deg: f64,
    },
}

fn default_max_distance_deg() -> f64 {
    DEFAULT_MAX_DISTANCE_DEG
}

fn default_window_deg() -> f64 {
    DEFAULT_WINDOW_DEG
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::Reverse {
            max_distance_deg: DEFAULT_MAX_DISTANCE_DEG,
        }
    }
}

impl BoundaryPolicy {
    /// Commit (or reject) a tentative position onto `vehicle`
    pub(crate) fn apply(&self, vehicle: &mut Vehicle, lat: f64, lng: f64, reference: Location) {
        match *self {
            BoundaryPolicy::Reverse { max_distance_deg } => {
                if reference.degree_distance(lat, lng) > max_distance_deg {
                    vehicle.direction = normalize_heading(vehicle.direction + 180.0);
                } else {
                    vehicle.lat = lat;
                    vehicle.lng = lng;
                }
            }
            BoundaryPolicy::Clamp { window_deg } => {
                // max/min rather than clamp: clamp panics on an inverted range
                vehicle.lat = lat
                    .max(reference.lat - window_deg)
                    .min(reference.lat + window_deg);
                vehicle.lng = lng
                    .max(reference.lng - window_deg)
                    .min(reference.lng + window_deg);
            }
        }
    }

    /// Whether a position lies inside the area this policy maintains
    pub fn contains(&self, reference: Location, lat: f64, lng: f64) -> bool {
        match *self {
            BoundaryPolicy::Reverse { max_distance_deg } => {
                reference.degree_distance(lat, lng) <= max_distance_deg + TOLERANCE_DEG
            }
            BoundaryPolicy::Clamp { window_deg } => {
                let limit = window_deg + TOLERANCE_DEG;
                (lat - reference.lat).abs() <= limit && (lng - reference.lng).abs() <= limit
            }
        }
    }
}
