//! Error types raised by the simulation core.

use thiserror::Error;

/// Errors raised while building or running a simulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// A construction-time parameter is out of range.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// A vector or matrix does not have the length the receiver expects.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A network does not fit the sensor and control widths of a car.
    #[error(
        "incompatible network: expected {expected_inputs} inputs and {expected_outputs} outputs, \
         found {found_inputs} inputs and {found_outputs} outputs"
    )]
    IncompatibleNetwork {
        /// Sensor ray count.
        expected_inputs: usize,
        /// Control width.
        expected_outputs: usize,
        /// Network input width.
        found_inputs: usize,
        /// Network output width.
        found_outputs: usize,
    },
}

impl SimulationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
