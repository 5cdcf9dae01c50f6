//! A single threshold layer.

use ndarray::{Array1, Array2, Zip};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use serde::{Deserialize, Serialize};

use super::super::error::SimulationError;
use super::super::geometry::lerp;

/// One fully connected layer with a step activation.
///
/// A neuron fires (outputs 1) when its weighted input sum is *below* its
/// bias, and stays at 0 otherwise. Learned networks depend on this
/// direction, so it must not be flipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Weight matrix (`input_count` × `output_count`).
    weights: Array2<f32>,
    /// Bias vector (`output_count`).
    biases: Array1<f32>,
    /// Inputs seen by the last forward pass.
    inputs: Array1<f32>,
    /// Outputs produced by the last forward pass.
    outputs: Array1<f32>,
}

/// Uniform draw over `[-1, 1]` used for initialization and mutation.
fn unit_range() -> Uniform<f32> {
    Uniform::new_inclusive(-1.0, 1.0)
}

impl Layer {
    /// Creates a layer with weights and biases drawn uniformly from `[-1, 1]`.
    pub fn new_random(input_count: usize, output_count: usize) -> Self {
        let mut layer = Self {
            weights: Array2::zeros((input_count, output_count)),
            biases: Array1::zeros(output_count),
            inputs: Array1::zeros(input_count),
            outputs: Array1::zeros(output_count),
        };
        layer.randomize();
        layer
    }

    /// Creates a layer from explicit parameters.
    ///
    /// # Arguments
    ///
    /// * `weights` - Matrix indexed `[input][output]`
    /// * `biases` - One bias per output neuron
    pub fn from_parts(weights: Array2<f32>, biases: Array1<f32>) -> Result<Self, SimulationError> {
        let (input_count, output_count) = weights.dim();
        if input_count == 0 || output_count == 0 {
            return Err(SimulationError::config("layer dimensions must be non-zero"));
        }
        if biases.len() != output_count {
            return Err(SimulationError::DimensionMismatch {
                expected: output_count,
                actual: biases.len(),
            });
        }

        Ok(Self {
            weights,
            biases,
            inputs: Array1::zeros(input_count),
            outputs: Array1::zeros(output_count),
        })
    }

    /// Redraws every weight and bias uniformly from `[-1, 1]`.
    ///
    /// Dimensions and cached activations are left as they are.
    pub fn randomize(&mut self) {
        self.weights = Array2::random(self.weights.raw_dim(), unit_range());
        self.biases = Array1::random(self.biases.len(), unit_range());
    }

    /// Runs the layer and caches both its inputs and outputs.
    pub fn forward(&mut self, inputs: &Array1<f32>) -> Result<Array1<f32>, SimulationError> {
        if inputs.len() != self.input_count() {
            return Err(SimulationError::DimensionMismatch {
                expected: self.input_count(),
                actual: inputs.len(),
            });
        }

        let sums = inputs.dot(&self.weights);
        let outputs = Zip::from(&sums)
            .and(&self.biases)
            .map_collect(|&sum, &bias| if sum < bias { 1.0 } else { 0.0 });

        self.inputs.assign(inputs);
        self.outputs.assign(&outputs);
        Ok(outputs)
    }

    /// Blends every parameter toward a fresh uniform draw.
    ///
    /// `amount = 0` keeps the layer, `amount = 1` replaces it entirely.
    pub fn mutate(&mut self, amount: f32) {
        let weight_noise = Array2::random(self.weights.raw_dim(), unit_range());
        self.weights
            .zip_mut_with(&weight_noise, |w, &r| *w = lerp(*w, r, amount));

        let bias_noise = Array1::random(self.biases.len(), unit_range());
        self.biases
            .zip_mut_with(&bias_noise, |b, &r| *b = lerp(*b, r, amount));
    }

    /// Number of inputs this layer accepts.
    pub fn input_count(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of neurons in this layer.
    pub fn output_count(&self) -> usize {
        self.weights.ncols()
    }

    /// Weight matrix indexed `[input][output]`.
    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// One bias per output neuron.
    pub fn biases(&self) -> &Array1<f32> {
        &self.biases
    }

    /// Inputs cached by the last forward pass (zeros before the first one).
    pub fn inputs(&self) -> &Array1<f32> {
        &self.inputs
    }

    /// Outputs cached by the last forward pass (zeros before the first one).
    pub fn outputs(&self) -> &Array1<f32> {
        &self.outputs
    }
}

/// Serialized form of a [`Layer`].
///
/// The lengths of `inputs` and `outputs` declare the layer's dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Cached inputs.
    pub inputs: Vec<f32>,
    /// Cached outputs.
    pub outputs: Vec<f32>,
    /// One bias per output.
    pub biases: Vec<f32>,
    /// Weights indexed `[input][output]`.
    pub weights: Vec<Vec<f32>>,
}

impl From<&Layer> for LevelRecord {
    fn from(layer: &Layer) -> Self {
        Self {
            inputs: layer.inputs.to_vec(),
            outputs: layer.outputs.to_vec(),
            biases: layer.biases.to_vec(),
            weights: layer.weights.outer_iter().map(|row| row.to_vec()).collect(),
        }
    }
}

impl TryFrom<LevelRecord> for Layer {
    type Error = SimulationError;

    fn try_from(record: LevelRecord) -> Result<Self, Self::Error> {
        let input_count = record.inputs.len();
        let output_count = record.outputs.len();

        if record.weights.len() != input_count {
            return Err(SimulationError::DimensionMismatch {
                expected: input_count,
                actual: record.weights.len(),
            });
        }
        if let Some(row) = record.weights.iter().find(|row| row.len() != output_count) {
            return Err(SimulationError::DimensionMismatch {
                expected: output_count,
                actual: row.len(),
            });
        }

        let flat: Vec<f32> = record.weights.into_iter().flatten().collect();
        let actual = flat.len();
        let weights = Array2::from_shape_vec((input_count, output_count), flat).map_err(|_| {
            SimulationError::DimensionMismatch {
                expected: input_count * output_count,
                actual,
            }
        })?;

        let mut layer = Self::from_parts(weights, Array1::from_vec(record.biases))?;
        layer.inputs = Array1::from_vec(record.inputs);
        layer.outputs = Array1::from_vec(record.outputs);
        Ok(layer)
    }
}
