// Vehicle model: kinematic state and per-tick movement

mod boundary;

pub use boundary::BoundaryPolicy;

use crate::location::{Location, KM_PER_DEGREE};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

pub const MIN_SPEED_KMH: f64 = 40.0;
pub const MAX_SPEED_KMH: f64 = 80.0;

/// Maximum heading change per tick, in degrees either way
pub const HEADING_JITTER_DEG: f64 = 30.0;

pub const SPEED_CHANGE_PROBABILITY: f64 = 0.1;
pub const STATUS_CHANGE_PROBABILITY: f64 = 0.05;

/// Operational status reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Available,
    Busy,
    Offline,
}

impl VehicleStatus {
    pub const ALL: [VehicleStatus; 3] = [
        VehicleStatus::Available,
        VehicleStatus::Busy,
        VehicleStatus::Offline,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Busy => "busy",
            VehicleStatus::Offline => "offline",
        }
    }
}

/// Errors raised while advancing a vehicle
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// The computed position or heading was NaN or infinite
    NonFinite { id: String },
}

impl std::fmt::Display for MotionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MotionError::NonFinite { id } => {
                write!(f, "vehicle {} produced a non-finite state", id)
            }
        }
    }
}

impl std::error::Error for MotionError {}

/// A single simulated vehicle
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    /// Sequential label, e.g. "UBER-001"
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    /// km/h, within [MIN_SPEED_KMH, MAX_SPEED_KMH]
    pub speed: f64,
    /// Heading in degrees, always within [0, 360)
    pub direction: f64,
    pub status: VehicleStatus,
}

/// Serialized view of one vehicle as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub speed: f64,
    pub direction: f64,
    pub status: VehicleStatus,
    /// Seconds since the Unix epoch, captured when the snapshot was taken
    pub timestamp: f64,
}

impl Vehicle {
    /// Create a vehicle at the given position with random speed, heading and status
    pub fn new<R: Rng + ?Sized>(id: impl Into<String>, lat: f64, lng: f64, rng: &mut R) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            speed: random_speed(rng),
            direction: rng.gen_range(0.0..360.0),
            status: VehicleStatus::random(rng),
        }
    }

    /// Label for the n-th vehicle of a fleet (1-based)
    pub fn label(n: usize) -> String {
        format!("UBER-{:03}", n)
    }

    /// Advance one tick.
    ///
    /// The heading is jittered by up to ±30°, the vehicle moves
    /// `speed / 111 / 3600` degrees along it, and `policy` keeps the result
    /// near `reference`. Speed and status are then re-rolled independently.
    ///
    /// The new state is built on a copy and only committed when finite, so a
    /// failing vehicle keeps its previous state.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        reference: Location,
        policy: BoundaryPolicy,
        rng: &mut R,
    ) -> Result<(), MotionError> {
        if !reference.is_finite() {
            return Err(MotionError::NonFinite {
                id: self.id.clone(),
            });
        }

        let mut next = self.clone();

        let jitter = rng.gen_range(-HEADING_JITTER_DEG..=HEADING_JITTER_DEG);
        next.direction = normalize_heading(next.direction + jitter);

        let step = next.speed / KM_PER_DEGREE / 3600.0;
        let heading = next.direction.to_radians();
        let tentative_lat = next.lat + step * heading.cos();
        let tentative_lng = next.lng + step * heading.sin();
        if !tentative_lat.is_finite() || !tentative_lng.is_finite() {
            return Err(MotionError::NonFinite {
                id: self.id.clone(),
            });
        }

        policy.apply(&mut next, tentative_lat, tentative_lng, reference);

        if rng.gen_bool(SPEED_CHANGE_PROBABILITY) {
            next.speed = random_speed(rng);
        }
        if rng.gen_bool(STATUS_CHANGE_PROBABILITY) {
            next.status = VehicleStatus::random(rng);
        }

        if !next.is_finite() {
            return Err(MotionError::NonFinite {
                id: self.id.clone(),
            });
        }

        *self = next;
        Ok(())
    }

    /// Wire representation; timestamp is taken now, not at tick time
    pub fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            id: self.id.clone(),
            lat: round_to(self.lat, 6),
            lng: round_to(self.lng, 6),
            speed: round_to(self.speed, 1),
            direction: round_to(self.direction, 1),
            status: self.status,
            timestamp: Utc::now().timestamp_micros() as f64 / 1_000_000.0,
        }
    }

    fn is_finite(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.speed.is_finite()
            && self.direction.is_finite()
    }
}

/// Wrap a heading into [0, 360)
pub fn normalize_heading(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid of a tiny negative value rounds up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn random_speed<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(MIN_SPEED_KMH..=MAX_SPEED_KMH)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
