//! Read-only views of the simulation for renderers.
//!
//! Snapshots are plain serializable data; nothing here draws.

use serde::{Deserialize, Serialize};

use super::brain::NetworkRecord;
use super::car::Car;
use super::controls::Controls;
use super::geometry::{Intersection, Polygon, Segment, Vector2};
use super::sensor::Sensor;

/// Rays and readings of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Rays in index order.
    pub rays: Vec<Segment>,
    /// Closest hit per ray.
    pub readings: Vec<Option<Intersection>>,
}

impl From<&Sensor> for SensorSnapshot {
    fn from(sensor: &Sensor) -> Self {
        Self {
            rays: sensor.rays().to_vec(),
            readings: sensor.readings().to_vec(),
        }
    }
}

/// Everything a renderer needs to draw one car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSnapshot {
    /// Car id.
    pub id: usize,
    /// Center of the car.
    pub position: Vector2,
    /// Heading in radians.
    pub heading: f32,
    /// Signed speed.
    pub speed: f32,
    /// Whether the car has crashed.
    pub damaged: bool,
    /// Collision polygon.
    pub polygon: Polygon,
    /// Current steering state.
    pub controls: Controls,
    /// Sensor state, for sensing cars.
    pub sensor: Option<SensorSnapshot>,
    /// Network weights and cached activations, for sensing cars.
    pub network: Option<NetworkRecord>,
}

impl From<&Car> for CarSnapshot {
    fn from(car: &Car) -> Self {
        Self {
            id: car.id(),
            position: car.position(),
            heading: car.heading(),
            speed: car.speed(),
            damaged: car.is_damaged(),
            polygon: *car.polygon(),
            controls: car.controls(),
            sensor: car.sensor().map(SensorSnapshot::from),
            network: car.brain().map(|brain| brain.to_record()),
        }
    }
}

/// The whole simulation at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Ticks since the generation started.
    pub tick: u64,
    /// Generation counter.
    pub generation: u32,
    /// Index of the best car in `cars`.
    pub best: Option<usize>,
    /// Road borders.
    pub borders: Vec<Segment>,
    /// X positions of lane dividers.
    pub lane_dividers: Vec<f32>,
    /// Learning cars.
    pub cars: Vec<CarSnapshot>,
    /// Traffic cars.
    pub traffic: Vec<CarSnapshot>,
}
