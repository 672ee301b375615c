use crate::fleet::{FleetSettings, DEFAULT_FLEET_SIZE, DEFAULT_SPAWN_RADIUS_KM};
use crate::location::{Location, DEFAULT_LAT, DEFAULT_LNG, KM_PER_DEGREE};
use crate::vehicle::BoundaryPolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;


/// Complete Fleetcast configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetcastConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory served under /static
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

fn default_static_dir() -> String {
    "static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

/// Fleet and tick configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_vehicle_count")]
    pub vehicle_count: usize,
    #[serde(default = "default_spawn_radius_km")]
    pub spawn_radius_km: f64,
    /// Reference location used until a client sends its own
    #[serde(default = "default_lat")]
    pub default_lat: f64,
    #[serde(default = "default_lng")]
    pub default_lng: f64,
    #[serde(default)]
    pub boundary: BoundaryPolicy,
}

fn default_tick_interval_ms() -> u64 {
    500
}

fn default_vehicle_count() -> usize {
    DEFAULT_FLEET_SIZE
}

fn default_spawn_radius_km() -> f64 {
    DEFAULT_SPAWN_RADIUS_KM
}

fn default_lat() -> f64 {
    DEFAULT_LAT
}

fn default_lng() -> f64 {
    DEFAULT_LNG
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            vehicle_count: default_vehicle_count(),
            spawn_radius_km: default_spawn_radius_km(),
            default_lat: default_lat(),
            default_lng: default_lng(),
            boundary: BoundaryPolicy::default(),
        }
    }
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn default_location(&self) -> Location {
        Location::new(self.default_lat, self.default_lng)
    }

    pub fn fleet_settings(&self) -> FleetSettings {
        FleetSettings {
            vehicle_count: self.vehicle_count,
            spawn_radius_km: self.spawn_radius_km,
            boundary: self.boundary,
        }
    }
}

/// Fan-out configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// How long a broadcast waits on one subscriber before dropping it
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Outbound frames buffered per connection
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_send_timeout_ms() -> u64 {
    250
}

fn default_channel_capacity() -> usize {
    32
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl BroadcastConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(std::io::Error),
    /// Config file is not valid TOML for this schema
    Parse(toml::de::Error),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl FleetcastConfig {
    /// Override fields from FLEETCAST_* env vars; unparseable values are ignored
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("FLEETCAST_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("FLEETCAST_PORT") {
            if let Ok(n) = v.parse::<u16>() {
                self.server.port = n;
            }
        }
        if let Some(v) = lookup("FLEETCAST_STATIC_DIR") {
            self.server.static_dir = v;
        }
        if let Some(v) = lookup("FLEETCAST_TICK_INTERVAL_MS") {
            if let Ok(n) = v.parse::<u64>() {
                self.simulation.tick_interval_ms = n;
            }
        }
        if let Some(v) = lookup("FLEETCAST_VEHICLE_COUNT") {
            if let Ok(n) = v.parse::<usize>() {
                self.simulation.vehicle_count = n;
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "simulation.tick_interval_ms must be positive".to_string(),
            ));
        }
        if !(self.simulation.spawn_radius_km >= 0.0) {
            return Err(ConfigError::Invalid(
                "simulation.spawn_radius_km must be zero or positive".to_string(),
            ));
        }
        if !self.simulation.default_location().is_finite() {
            return Err(ConfigError::Invalid(
                "simulation default location must be finite".to_string(),
            ));
        }
        let bound = match self.simulation.boundary {
            BoundaryPolicy::Reverse { max_distance_deg } => max_distance_deg,
            BoundaryPolicy::Clamp { window_deg } => window_deg,
        };
        if !(bound > 0.0) {
            return Err(ConfigError::Invalid(
                "simulation.boundary limit must be positive".to_string(),
            ));
        }
        // Vehicles spawned outside the boundary would never move back in
        let spawn_radius_deg = self.simulation.spawn_radius_km / KM_PER_DEGREE;
        if spawn_radius_deg > bound {
            return Err(ConfigError::Invalid(format!(
                "simulation.spawn_radius_km ({} km) reaches past the boundary limit ({} deg)",
                self.simulation.spawn_radius_km, bound
            )));
        }
        if self.broadcast.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "broadcast.channel_capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<FleetcastConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FleetcastConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok(config)
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_or_default(path: impl AsRef<Path>) -> Result<FleetcastConfig, ConfigError> {
    match load_config(&path) {
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.as_ref().display(), "Config file not found, using defaults");
            Ok(FleetcastConfig::default())
        }
        other => other,
    }
}
