use crate::fleet::FleetView;
use crate::location::Location;
use crate::vehicle::VehicleSnapshot;
use serde::{Deserialize, Serialize};

/// Client → Server message types
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Move the shared reference location and regenerate the fleet around it
    #[serde(rename = "user_location")]
    UserLocation { lat: f64, lng: f64 },
}

/// Server → Client message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent once to a new connection
    #[serde(rename = "initial_data")]
    InitialData {
        vehicles: Vec<VehicleSnapshot>,
        user_location: Location,
    },
    /// Sent to every subscriber each tick
    #[serde(rename = "vehicle_update")]
    VehicleUpdate { vehicles: Vec<VehicleSnapshot> },
    /// Sent to every subscriber after any client moves the reference location
    #[serde(rename = "location_updated")]
    LocationUpdated {
        vehicles: Vec<VehicleSnapshot>,
        user_location: Location,
    },
}

impl ServerMessage {
    pub fn initial_data(view: FleetView) -> Self {
        ServerMessage::InitialData {
            vehicles: view.vehicles,
            user_location: view.reference,
        }
    }

    pub fn vehicle_update(vehicles: Vec<VehicleSnapshot>) -> Self {
        ServerMessage::VehicleUpdate { vehicles }
    }

    pub fn location_updated(view: FleetView) -> Self {
        ServerMessage::LocationUpdated {
            vehicles: view.vehicles,
            user_location: view.reference,
        }
    }

    /// Serialize to the JSON text frame sent over the wire
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Parse an inbound text frame
pub fn parse_client_message(text: &str) -> serde_json::Result<ClientMessage> {
    serde_json::from_str(text)
}
