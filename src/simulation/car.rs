//! Car kinematics, collision footprint and damage state.
//!
//! Heading 0 faces up (toward negative y). Moving forward subtracts
//! `(sin(heading), cos(heading)) * speed` from the position; the footprint
//! and the sensor rays use the same convention.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::brain::NeuralNetwork;
use super::controls::{CONTROL_COUNT, ControlSource, Controls};
use super::error::SimulationError;
use super::geometry::{Polygon, Segment, Vector2, polygon_touches_segment, polygons_intersect};
use super::params::BodyParams;
use super::sensor::{Sensor, direction};

/// Position and heading of a car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Center of the car.
    pub position: Vector2,
    /// Heading in radians.
    pub heading: f32,
}

impl Pose {
    /// A pose facing straight up the road.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vector2 { x, y },
            heading: 0.0,
        }
    }
}

/// A car's footprint as seen by other cars.
///
/// The owner id lets a car skip its own footprint when it appears in a
/// shared obstacle list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Id of the car this footprint belongs to.
    pub owner: usize,
    /// Collision polygon.
    pub polygon: Polygon,
}

/// What a car perceives with and thinks with.
#[derive(Debug, Clone, PartialEq)]
pub enum Pilot {
    /// A ray sensor feeding a network.
    Sensing {
        /// Ray fan.
        sensor: Sensor,
        /// Network fed by the sensor.
        brain: NeuralNetwork,
    },
    /// No perception at all; used for traffic.
    Sensorless,
}

impl Pilot {
    /// Pairs a sensor with a network, checking that their widths fit.
    ///
    /// # Errors
    ///
    /// [`SimulationError::IncompatibleNetwork`] if the network input width is
    /// not the ray count, or the output width is not the control width.
    pub fn sensing(sensor: Sensor, brain: NeuralNetwork) -> Result<Self, SimulationError> {
        check_network(&brain, sensor.ray_count())?;
        Ok(Self::Sensing { sensor, brain })
    }
}

/// Rejects networks that do not map `ray_count` readings to the four controls.
pub fn check_network(brain: &NeuralNetwork, ray_count: usize) -> Result<(), SimulationError> {
    if brain.input_count() != ray_count || brain.output_count() != CONTROL_COUNT {
        return Err(SimulationError::IncompatibleNetwork {
            expected_inputs: ray_count,
            expected_outputs: CONTROL_COUNT,
            found_inputs: brain.input_count(),
            found_outputs: brain.output_count(),
        });
    }
    Ok(())
}

/// A simulated car.
///
/// A car starts alive and becomes damaged the first tick its footprint
/// touches a border or another car. Damage is permanent: the car stays
/// frozen in place, although its sensor and network keep running.
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    id: usize,
    position: Vector2,
    heading: f32,
    speed: f32,
    acceleration: f32,
    friction: f32,
    max_speed: f32,
    turn_rate: f32,
    width: f32,
    height: f32,
    polygon: Polygon,
    damaged: bool,
    source: ControlSource,
    controls: Controls,
    pilot: Pilot,
}

impl Car {
    /// Creates a car at rest.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier, unique among all cars that can collide
    /// * `pose` - Starting position and heading
    /// * `body` - Dimensions and handling
    /// * `source` - Who drives the car
    /// * `pilot` - Sensor and network, if any
    ///
    /// # Errors
    ///
    /// Fails for body parameters rejected by [`BodyParams::validate`], or for
    /// a network-driven car without a network.
    pub fn new(
        id: usize,
        pose: Pose,
        body: &BodyParams,
        source: ControlSource,
        pilot: Pilot,
    ) -> Result<Self, SimulationError> {
        body.validate()?;
        if source == ControlSource::NeuralNetworkDriven && matches!(pilot, Pilot::Sensorless) {
            return Err(SimulationError::config(
                "a network-driven car needs a sensor and a network",
            ));
        }

        let mut car = Self {
            id,
            position: pose.position,
            heading: pose.heading,
            speed: 0.0,
            acceleration: body.acceleration,
            friction: body.friction,
            max_speed: body.max_speed,
            turn_rate: body.turn_rate,
            width: body.width,
            height: body.height,
            polygon: [pose.position; 4],
            damaged: false,
            source,
            controls: Controls::for_source(source),
            pilot,
        };
        car.polygon = car.build_polygon();
        Ok(car)
    }

    /// Advances the car by one tick.
    ///
    /// # Arguments
    ///
    /// * `borders` - Road borders
    /// * `obstacles` - Footprints of cars to collide with and sense; the
    ///   car's own footprint is ignored if present
    pub fn update(
        &mut self,
        borders: &[Segment],
        obstacles: &[Footprint],
    ) -> Result<(), SimulationError> {
        let others: Vec<&Polygon> = obstacles
            .iter()
            .filter(|footprint| footprint.owner != self.id)
            .map(|footprint| &footprint.polygon)
            .collect();

        if !self.damaged {
            self.drive();
            self.polygon = self.build_polygon();
            self.damaged = self.assess_damage(borders, &others);
        }

        if let Pilot::Sensing { sensor, brain } = &mut self.pilot {
            sensor.update(self.position, self.heading, borders, &others);
            let outputs = brain.forward(&sensor.inputs())?;
            if self.source == ControlSource::NeuralNetworkDriven {
                self.controls = Controls::from_outputs(&outputs);
            }
        }

        Ok(())
    }

    /// Applies the controls to speed, heading and position.
    fn drive(&mut self) {
        if self.controls.forward {
            self.speed += self.acceleration;
        }
        if self.controls.reverse {
            self.speed -= self.acceleration;
        }

        let reverse_limit = -self.max_speed / 2.0;
        if self.speed < reverse_limit {
            self.speed = reverse_limit;
        }

        if self.speed > 0.0 {
            self.speed -= self.friction;
        } else if self.speed < 0.0 {
            self.speed += self.friction;
        }

        if self.speed > self.max_speed {
            self.speed = self.max_speed;
        }
        if self.speed.abs() < self.friction {
            self.speed = 0.0;
        }

        // turning flips when reversing
        if self.speed != 0.0 {
            let flip = self.speed.signum();
            if self.controls.left {
                self.heading += self.turn_rate * flip;
            }
            if self.controls.right {
                self.heading -= self.turn_rate * flip;
            }
        }

        self.position = self.position - direction(self.heading) * self.speed;
    }

    fn build_polygon(&self) -> Polygon {
        let radius = (self.width / 2.0).hypot(self.height / 2.0);
        let alpha = self.width.atan2(self.height);
        let corner = |angle: f32| self.position - direction(angle) * radius;

        [
            corner(self.heading - alpha),
            corner(self.heading + alpha),
            corner(PI + self.heading - alpha),
            corner(PI + self.heading + alpha),
        ]
    }

    fn assess_damage(&self, borders: &[Segment], others: &[&Polygon]) -> bool {
        borders
            .iter()
            .any(|border| polygon_touches_segment(&self.polygon, border))
            || others
                .iter()
                .any(|polygon| polygons_intersect(&self.polygon, polygon.as_slice()))
    }

    /// Writes controls from an external input device.
    ///
    /// Only `ExternalInput` cars accept this; returns whether it applied.
    pub fn steer(&mut self, controls: Controls) -> bool {
        if self.source == ControlSource::ExternalInput {
            self.controls = controls;
            true
        } else {
            false
        }
    }

    /// This car's footprint for other cars' obstacle lists.
    pub fn footprint(&self) -> Footprint {
        Footprint {
            owner: self.id,
            polygon: self.polygon,
        }
    }

    /// Identifier used for self-exclusion.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Center of the car.
    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Heading in radians; 0 faces up the road.
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Signed speed; negative while reversing.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Top forward speed.
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Collision polygon; frozen once damaged.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Whether the car has crashed.
    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    /// Who drives the car.
    pub fn source(&self) -> ControlSource {
        self.source
    }

    /// Current steering state.
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Sensor and network, if any.
    pub fn pilot(&self) -> &Pilot {
        &self.pilot
    }

    /// The sensor, for sensing cars.
    pub fn sensor(&self) -> Option<&Sensor> {
        match &self.pilot {
            Pilot::Sensing { sensor, .. } => Some(sensor),
            Pilot::Sensorless => None,
        }
    }

    /// The network, for sensing cars.
    pub fn brain(&self) -> Option<&NeuralNetwork> {
        match &self.pilot {
            Pilot::Sensing { brain, .. } => Some(brain),
            Pilot::Sensorless => None,
        }
    }
}
