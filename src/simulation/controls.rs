//! Steering signals and where they come from.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Number of control signals a network must produce.
pub const CONTROL_COUNT: usize = 4;

/// Who drives a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlSource {
    /// Controls are copied from the car's network every tick.
    #[default]
    NeuralNetworkDriven,
    /// Controls are written by an external input device.
    ExternalInput,
    /// Forward is held permanently; used for traffic.
    ConstantForward,
}

/// The four-button steering state consumed by kinematics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Controls {
    /// Accelerate.
    pub forward: bool,
    /// Turn left.
    pub left: bool,
    /// Turn right.
    pub right: bool,
    /// Brake and reverse.
    pub reverse: bool,
}

impl Controls {
    /// Initial controls for a given source.
    pub fn for_source(source: ControlSource) -> Self {
        match source {
            ControlSource::ConstantForward => Self {
                forward: true,
                ..Self::default()
            },
            ControlSource::NeuralNetworkDriven | ControlSource::ExternalInput => Self::default(),
        }
    }

    /// Reads network outputs in `forward, left, right, reverse` order.
    ///
    /// Any non-zero output counts as pressed.
    pub fn from_outputs(outputs: &Array1<f32>) -> Self {
        let pressed = |i: usize| outputs.get(i).is_some_and(|&v| v != 0.0);
        Self {
            forward: pressed(0),
            left: pressed(1),
            right: pressed(2),
            reverse: pressed(3),
        }
    }
}
