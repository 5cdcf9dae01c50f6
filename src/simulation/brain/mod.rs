//! Neural network implementation for car brains.
//!
//! Networks are small stacks of threshold layers. They are never trained by
//! gradient descent; instead each generation clones the best network found so
//! far and blends its parameters toward fresh random values.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;
use super::storage::StorageError;

pub mod layer;

pub use layer::{Layer, LevelRecord};

/// A feed-forward network with a fixed topology.
///
/// Serializes as `{ "levels": [ { inputs, outputs, biases, weights }, ... ] }`.
/// Deserialization validates every layer's dimensions and the chaining
/// between consecutive layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "NetworkRecord", try_from = "NetworkRecord")]
pub struct NeuralNetwork {
    /// Ordered layers from input to output.
    layers: Vec<Layer>,
}

impl NeuralNetwork {
    /// Creates a randomly initialized network.
    ///
    /// # Arguments
    ///
    /// * `neuron_counts` - Neurons per level, starting with the input width
    ///
    /// # Errors
    ///
    /// Fails with a configuration error for fewer than two levels or a zero count.
    pub fn new(neuron_counts: &[usize]) -> Result<Self, SimulationError> {
        if neuron_counts.len() < 2 {
            return Err(SimulationError::config(
                "a network needs at least an input and an output level",
            ));
        }
        if neuron_counts.contains(&0) {
            return Err(SimulationError::config("neuron counts must be positive"));
        }

        let layers = neuron_counts
            .windows(2)
            .map(|pair| Layer::new_random(pair[0], pair[1]))
            .collect();

        Ok(Self { layers })
    }

    /// Assembles a network from existing layers, checking that they chain.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self, SimulationError> {
        if layers.is_empty() {
            return Err(SimulationError::config("a network needs at least one layer"));
        }
        for pair in layers.windows(2) {
            if pair[0].output_count() != pair[1].input_count() {
                return Err(SimulationError::DimensionMismatch {
                    expected: pair[0].output_count(),
                    actual: pair[1].input_count(),
                });
            }
        }

        Ok(Self { layers })
    }

    /// Runs a forward pass through all layers.
    ///
    /// Each layer caches the inputs and outputs it saw, for inspection.
    pub fn forward(&mut self, inputs: &Array1<f32>) -> Result<Array1<f32>, SimulationError> {
        let mut output = inputs.clone();
        for layer in &mut self.layers {
            output = layer.forward(&output)?;
        }
        Ok(output)
    }

    /// Blends every weight and bias toward a fresh uniform draw by `amount`.
    pub fn mutate(&mut self, amount: f32) {
        for layer in &mut self.layers {
            layer.mutate(amount);
        }
    }

    /// Returns a mutated copy, leaving `self` untouched.
    pub fn mutated(&self, amount: f32) -> Self {
        let mut child = self.clone();
        child.mutate(amount);
        child
    }

    /// Width of the input vector.
    pub fn input_count(&self) -> usize {
        self.layers[0].input_count()
    }

    /// Width of the output vector.
    pub fn output_count(&self) -> usize {
        self.layers[self.layers.len() - 1].output_count()
    }

    /// Neurons per level, input width first.
    pub fn neuron_counts(&self) -> Vec<usize> {
        std::iter::once(self.input_count())
            .chain(self.layers.iter().map(Layer::output_count))
            .collect()
    }

    /// Layers from input to output.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Converts the network into its serialized shape.
    pub fn to_record(&self) -> NetworkRecord {
        NetworkRecord {
            levels: self.layers.iter().map(LevelRecord::from).collect(),
        }
    }

    /// Saves the network as JSON.
    pub fn save_to_file(&self, path: &str) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a network from JSON written by [`NeuralNetwork::save_to_file`].
    pub fn load_from_file(path: &str) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parses a network from its JSON record.
    ///
    /// Malformed JSON is a [`StorageError::Json`]; well-formed JSON whose
    /// levels do not fit together is a [`StorageError::Simulation`] carrying
    /// the [`SimulationError::DimensionMismatch`].
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        let record: NetworkRecord = serde_json::from_str(json)?;
        Ok(Self::try_from(record)?)
    }
}

/// Serialized form of a [`NeuralNetwork`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkRecord {
    /// One entry per layer, input side first.
    pub levels: Vec<LevelRecord>,
}

impl From<NeuralNetwork> for NetworkRecord {
    fn from(network: NeuralNetwork) -> Self {
        network.to_record()
    }
}

impl TryFrom<NetworkRecord> for NeuralNetwork {
    type Error = SimulationError;

    fn try_from(record: NetworkRecord) -> Result<Self, Self::Error> {
        let layers = record
            .levels
            .into_iter()
            .map(Layer::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_layers(layers)
    }
}
