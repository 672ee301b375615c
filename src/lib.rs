// Reference location shared by the fleet
pub mod location;

// Vehicle model and movement
pub mod vehicle;

// Fleet generation and shared fleet store
pub mod fleet;

// Subscriber registry, wire protocol and sessions
pub mod subscription;

// Fixed-interval simulation loop
pub mod simulation;

// HTTP and WebSocket APIs
pub mod api;

// Configuration loading
pub mod config;
