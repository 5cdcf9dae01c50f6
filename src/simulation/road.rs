//! A straight multi-lane road.

use serde::{Deserialize, Serialize};

use super::error::SimulationError;
use super::geometry::{Segment, Vector2, lerp};

/// A vertical road with solid borders on both sides.
///
/// The road runs from `-extent` to `+extent` along y, which stands in for
/// an endless track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    /// Horizontal center of the road.
    pub center_x: f32,
    /// Full road width.
    pub width: f32,
    /// Number of lanes.
    pub lane_count: usize,
    /// Left edge.
    pub left: f32,
    /// Right edge.
    pub right: f32,
    /// Top end (most negative y).
    pub top: f32,
    /// Bottom end.
    pub bottom: f32,
    /// Left and right border segments.
    pub borders: Vec<Segment>,
}

impl Road {
    /// Creates a road centered on `center_x`.
    ///
    /// # Arguments
    ///
    /// * `center_x` - Horizontal center
    /// * `width` - Total width (must be positive)
    /// * `lane_count` - Number of lanes (must be positive)
    /// * `extent` - Half the road length
    pub fn new(
        center_x: f32,
        width: f32,
        lane_count: usize,
        extent: f32,
    ) -> Result<Self, SimulationError> {
        if width.is_nan() || width <= 0.0 {
            return Err(SimulationError::config("road width must be positive"));
        }
        if lane_count == 0 {
            return Err(SimulationError::config("lane_count must be positive"));
        }

        let left = center_x - width / 2.0;
        let right = center_x + width / 2.0;
        let top = -extent;
        let bottom = extent;

        let borders = vec![
            Segment::new(Vector2 { x: left, y: top }, Vector2 { x: left, y: bottom }),
            Segment::new(Vector2 { x: right, y: top }, Vector2 { x: right, y: bottom }),
        ];

        Ok(Self {
            center_x,
            width,
            lane_count,
            left,
            right,
            top,
            bottom,
            borders,
        })
    }

    /// Horizontal center of a lane. Indices past the last lane clamp to it.
    pub fn lane_center(&self, lane: usize) -> f32 {
        let lane_width = self.width / self.lane_count as f32;
        self.left + lane_width / 2.0 + lane.min(self.lane_count - 1) as f32 * lane_width
    }

    /// X positions of the dashed dividers between lanes.
    pub fn lane_dividers(&self) -> Vec<f32> {
        (1..self.lane_count)
            .map(|i| lerp(self.left, self.right, i as f32 / self.lane_count as f32))
            .collect()
    }
}
