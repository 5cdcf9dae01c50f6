//! Ray-casting sensor.
//!
//! A fan of rays is cast from just ahead of the car. Each ray reports the
//! closest border or obstacle edge it crosses, which becomes one network input.

use ndarray::Array1;

use super::error::SimulationError;
use super::geometry::{
    Intersection, Polygon, Segment, Vector2, edges, lerp, line_intersection, segment_intersection,
};

/// A fan of rays with one reading per ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    ray_count: usize,
    ray_length: f32,
    /// Total angle covered by the fan, in radians.
    ray_spread: f32,
    /// Distance ahead of the car center where rays start.
    ray_offset: f32,
    rays: Vec<Segment>,
    readings: Vec<Option<Intersection>>,
}

impl Sensor {
    /// Creates a sensor.
    ///
    /// # Arguments
    ///
    /// * `ray_count` - Number of rays (must be positive)
    /// * `ray_length` - Length of each ray (must be positive)
    /// * `ray_spread` - Fan angle in radians
    /// * `ray_offset` - How far ahead of the car center rays start
    pub fn new(
        ray_count: usize,
        ray_length: f32,
        ray_spread: f32,
        ray_offset: f32,
    ) -> Result<Self, SimulationError> {
        if ray_count == 0 {
            return Err(SimulationError::config("ray_count must be positive"));
        }
        if ray_length.is_nan() || ray_length <= 0.0 {
            return Err(SimulationError::config("ray_length must be positive"));
        }

        Ok(Self {
            ray_count,
            ray_length,
            ray_spread,
            ray_offset,
            rays: Vec::with_capacity(ray_count),
            readings: vec![None; ray_count],
        })
    }

    /// Recasts the rays from the given pose and takes one reading per ray.
    ///
    /// # Arguments
    ///
    /// * `position` - Car center
    /// * `heading` - Car heading in radians (0 faces up, toward negative y)
    /// * `borders` - Static road borders
    /// * `obstacles` - Polygons of every other car the sensor can see
    pub fn update(
        &mut self,
        position: Vector2,
        heading: f32,
        borders: &[Segment],
        obstacles: &[&Polygon],
    ) {
        self.cast_rays(position, heading);
        self.readings = self
            .rays
            .iter()
            .map(|ray| Self::reading(ray, borders, obstacles))
            .collect();
    }

    fn cast_rays(&mut self, position: Vector2, heading: f32) {
        let start = position - direction(heading) * self.ray_offset;

        self.rays.clear();
        for i in 0..self.ray_count {
            let t = if self.ray_count == 1 {
                0.5
            } else {
                i as f32 / (self.ray_count - 1) as f32
            };
            let angle = lerp(self.ray_spread / 2.0, -self.ray_spread / 2.0, t) + heading;
            let end = start - direction(angle) * self.ray_length;
            self.rays.push(Segment::new(start, end));
        }
    }

    /// Closest hit along `ray`, if any.
    fn reading(ray: &Segment, borders: &[Segment], obstacles: &[&Polygon]) -> Option<Intersection> {
        let border_hits = borders.iter().filter_map(|border| line_intersection(ray, border));
        let obstacle_hits = obstacles.iter().flat_map(move |polygon| {
            edges(polygon.as_slice())
                .filter_map(move |(c, d)| segment_intersection(ray.start, ray.end, c, d))
        });

        border_hits
            .chain(obstacle_hits)
            .min_by(|a, b| a.offset.total_cmp(&b.offset))
    }

    /// Network inputs: 0 for no hit, `1 - offset` otherwise, so nearer
    /// obstacles give larger activations.
    pub fn inputs(&self) -> Array1<f32> {
        self.readings
            .iter()
            .map(|reading| reading.map_or(0.0, |hit| 1.0 - hit.offset))
            .collect()
    }

    /// Number of rays.
    pub fn ray_count(&self) -> usize {
        self.ray_count
    }

    /// Length of each ray.
    pub fn ray_length(&self) -> f32 {
        self.ray_length
    }

    /// Fan angle in radians.
    pub fn ray_spread(&self) -> f32 {
        self.ray_spread
    }

    /// Rays cast on the last update, in index order. Empty before the first update.
    pub fn rays(&self) -> &[Segment] {
        &self.rays
    }

    /// One reading per ray; always `ray_count` long.
    pub fn readings(&self) -> &[Option<Intersection>] {
        &self.readings
    }
}

/// Unit offset for a heading, before the "subtract to move forward" convention.
#[inline]
pub(crate) fn direction(angle: f32) -> Vector2 {
    Vector2 {
        x: angle.sin(),
        y: angle.cos(),
    }
}
