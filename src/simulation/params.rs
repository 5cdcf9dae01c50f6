//! Simulation parameters.
//!
//! Loaded from JSON; any field left out falls back to its default.

use serde::{Deserialize, Serialize};

use super::controls::{CONTROL_COUNT, ControlSource};
use super::error::SimulationError;
use super::storage::StorageError;

/// Road geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadParams {
    /// Horizontal center of the road.
    pub center_x: f32,
    /// Full road width.
    pub width: f32,
    /// Number of lanes.
    pub lane_count: usize,
    /// Half the road length; large enough to act as endless.
    pub extent: f32,
}

impl Default for RoadParams {
    fn default() -> Self {
        Self {
            center_x: 150.0,
            width: 270.0,
            lane_count: 3,
            extent: 1_000_000.0,
        }
    }
}

/// Car body and handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyParams {
    /// Car width.
    pub width: f32,
    /// Car length.
    pub height: f32,
    /// Top forward speed; reverse is capped at half of it.
    pub max_speed: f32,
    /// Speed gained per tick while accelerating.
    pub acceleration: f32,
    /// Speed lost per tick while rolling.
    pub friction: f32,
    /// Heading change per tick while turning, in radians.
    pub turn_rate: f32,
}

impl BodyParams {
    /// Checks dimensions and handling so that speed stays within
    /// `[-max_speed / 2, max_speed]`.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(positive(self.width) && positive(self.height)) {
            return Err(SimulationError::config("car width and height must be positive"));
        }
        if !positive(self.max_speed) {
            return Err(SimulationError::config("max_speed must be positive"));
        }
        if !(non_negative(self.acceleration) && non_negative(self.friction)) {
            return Err(SimulationError::config(
                "acceleration and friction must not be negative",
            ));
        }
        if !self.turn_rate.is_finite() {
            return Err(SimulationError::config("turn_rate must be finite"));
        }
        Ok(())
    }
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 60.0,
            max_speed: 3.0,
            acceleration: 0.2,
            friction: 0.03,
            turn_rate: 0.01,
        }
    }
}

/// Sensor fan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorParams {
    /// Number of rays; also the network input width.
    pub ray_count: usize,
    /// Length of each ray.
    pub ray_length: f32,
    /// Fan angle in radians.
    pub ray_spread: f32,
    /// Distance ahead of the car center where rays start.
    pub ray_offset: f32,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            ray_count: 5,
            ray_length: 140.0,
            ray_spread: std::f32::consts::PI,
            ray_offset: 20.0,
        }
    }
}

/// Where a generation starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartParams {
    /// Starting lane.
    pub lane: usize,
    /// Starting y coordinate.
    pub y: f32,
}

impl Default for StartParams {
    fn default() -> Self {
        Self { lane: 1, y: 100.0 }
    }
}

/// One traffic car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficParams {
    /// Lane index.
    pub lane: usize,
    /// Initial y coordinate.
    pub y: f32,
    /// Cruising speed.
    pub max_speed: f32,
}

impl TrafficParams {
    fn new(lane: usize, y: f32) -> Self {
        Self {
            lane,
            y,
            max_speed: 2.0,
        }
    }
}

/// Simulation parameters that control population behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Number of learning cars per generation.
    pub population_size: usize,
    /// Blend factor in `[0, 1]` applied when seeding from the best network.
    pub mutation_rate: f32,
    /// Whether population cars follow their networks or external input.
    pub control_source: ControlSource,
    /// Hidden layer widths between the sensor inputs and the four controls.
    pub hidden_layers: Vec<usize>,
    /// Whether learning cars collide with learning cars updated before them
    /// in the same tick. With this off they only meet borders and traffic.
    pub population_collisions: bool,
    /// Road geometry.
    pub road: RoadParams,
    /// Starting pose of every generation.
    pub start: StartParams,
    /// Body and handling of population cars.
    pub body: BodyParams,
    /// Sensor fan of population cars.
    pub sensor: SensorParams,
    /// Traffic layout. Traffic cars reuse `body` apart from their speed.
    pub traffic: Vec<TrafficParams>,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_rate: 0.1,
            control_source: ControlSource::NeuralNetworkDriven,
            hidden_layers: vec![6],
            population_collisions: true,
            road: RoadParams::default(),
            start: StartParams::default(),
            body: BodyParams::default(),
            sensor: SensorParams::default(),
            traffic: vec![
                TrafficParams::new(1, -100.0),
                TrafficParams::new(0, -300.0),
                TrafficParams::new(2, -300.0),
                TrafficParams::new(0, -500.0),
                TrafficParams::new(1, -500.0),
                TrafficParams::new(1, -700.0),
                TrafficParams::new(2, -700.0),
            ],
        }
    }
}

impl Params {
    /// Network topology: sensor inputs, hidden layers, then the controls.
    pub fn neuron_counts(&self) -> Vec<usize> {
        std::iter::once(self.sensor.ray_count)
            .chain(self.hidden_layers.iter().copied())
            .chain(std::iter::once(CONTROL_COUNT))
            .collect()
    }

    /// Checks every value that would otherwise fail deep inside construction.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.population_size == 0 {
            return Err(SimulationError::config("population_size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SimulationError::config("mutation_rate must be within [0, 1]"));
        }
        if self.hidden_layers.contains(&0) {
            return Err(SimulationError::config("hidden layer widths must be positive"));
        }
        if self.road.lane_count == 0 {
            return Err(SimulationError::config("lane_count must be positive"));
        }
        if !positive(self.road.width) {
            return Err(SimulationError::config("road width must be positive"));
        }
        self.body.validate()?;
        if self.sensor.ray_count == 0 {
            return Err(SimulationError::config("ray_count must be positive"));
        }
        if !positive(self.sensor.ray_length) {
            return Err(SimulationError::config("ray_length must be positive"));
        }
        if let Some(slow) = self.traffic.iter().find(|t| !positive(t.max_speed)) {
            return Err(SimulationError::config(format!(
                "traffic car in lane {} needs a positive max_speed",
                slow.lane
            )));
        }
        Ok(())
    }

    /// Saves the parameters as JSON.
    pub fn save_to_file(&self, path: &str) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads and validates parameters from JSON.
    pub fn load_from_file(path: &str) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }
}

/// False for zero, negatives and NaN.
fn positive(value: f32) -> bool {
    value > 0.0
}

/// False for negatives and NaN.
fn non_negative(value: f32) -> bool {
    value >= 0.0
}
