#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evodrive::simulation::brain::{Layer, NeuralNetwork};
use evodrive::simulation::error::SimulationError;
use ndarray::{Array1, Array2, array};

/// Every weight and bias of a network, input side first.
fn parameters(network: &NeuralNetwork) -> Vec<f32> {
    network
        .layers()
        .iter()
        .flat_map(|layer| {
            layer
                .weights()
                .iter()
                .chain(layer.biases().iter())
                .copied()
                .collect::<Vec<_>>()
        })
        .collect()
}

fn sample_inputs(len: usize, phase: f32) -> Array1<f32> {
    Array1::from_iter((0..len).map(|i| ((i as f32 + phase) * 0.37).sin()))
}

#[test]
fn test_network_requires_input_and_output_levels() {
    assert!(matches!(
        NeuralNetwork::new(&[]),
        Err(SimulationError::Configuration(_))
    ));
    assert!(matches!(
        NeuralNetwork::new(&[5]),
        Err(SimulationError::Configuration(_))
    ));
    assert!(matches!(
        NeuralNetwork::new(&[5, 0, 4]),
        Err(SimulationError::Configuration(_))
    ));
}

#[test]
fn test_network_topology() {
    let network = NeuralNetwork::new(&[5, 6, 4]).unwrap();

    assert_eq!(network.layers().len(), 2);
    assert_eq!(network.input_count(), 5);
    assert_eq!(network.output_count(), 4);
    assert_eq!(network.neuron_counts(), vec![5, 6, 4]);
    assert_eq!(network.layers()[0].weights().dim(), (5, 6));
    assert_eq!(network.layers()[1].biases().len(), 4);
}

#[test]
fn test_random_parameters_within_unit_range() {
    let network = NeuralNetwork::new(&[20, 30, 4]).unwrap();
    assert!(parameters(&network).iter().all(|p| (-1.0..=1.0).contains(p)));
}

#[test]
fn test_randomize_redraws_in_place() {
    let mut layer = Layer::new_random(30, 20);
    let weights = layer.weights().clone();
    let biases = layer.biases().clone();

    layer.randomize();

    assert_eq!(layer.weights().dim(), (30, 20));
    assert_eq!(layer.biases().len(), 20);
    assert_eq!(layer.input_count(), 30);
    assert_eq!(layer.output_count(), 20);
    assert!(layer.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
    assert!(layer.biases().iter().all(|b| (-1.0..=1.0).contains(b)));
    assert_ne!(layer.weights(), &weights);
    assert_ne!(layer.biases(), &biases);
}

#[test]
fn test_randomize_keeps_explicit_layer_shape() {
    let mut layer = Layer::from_parts(Array2::zeros((3, 2)), Array1::zeros(2)).unwrap();

    layer.randomize();

    assert_eq!(layer.weights().dim(), (3, 2));
    assert!(layer.weights().iter().any(|&w| w != 0.0));
    assert_eq!(layer.forward(&array![0.1, 0.2, 0.3]).unwrap().len(), 2);
}

#[test]
fn test_neuron_fires_when_sum_is_below_bias() {
    let mut layer = Layer::from_parts(array![[1.0, -1.0], [1.0, 1.0]], array![0.5, 0.5]).unwrap();

    // sums are [1, -1]
    let outputs = layer.forward(&array![1.0, 0.0]).unwrap();
    assert_eq!(outputs, array![0.0_f32, 1.0]);

    // a sum equal to its bias does not fire
    let outputs = layer.forward(&array![0.5, 0.0]).unwrap();
    assert_eq!(outputs[0], 0.0);
}

#[test]
fn test_layer_caches_last_pass() {
    let mut layer = Layer::new_random(3, 2);
    assert_eq!(layer.inputs(), &Array1::<f32>::zeros(3));

    let inputs = array![0.2, 0.4, 0.6];
    let outputs = layer.forward(&inputs).unwrap();

    assert_eq!(layer.inputs(), &inputs);
    assert_eq!(layer.outputs(), &outputs);
    assert!(outputs.iter().all(|&o| o == 0.0 || o == 1.0));
}

#[test]
fn test_layer_rejects_mismatched_biases() {
    let result = Layer::from_parts(array![[1.0, 2.0], [3.0, 4.0]], array![0.5]);
    assert_eq!(
        result.unwrap_err(),
        SimulationError::DimensionMismatch {
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn test_forward_is_deterministic() {
    let mut network = NeuralNetwork::new(&[5, 6, 4]).unwrap();
    let inputs = sample_inputs(5, 1.0);

    let first = network.forward(&inputs).unwrap();
    let second = network.forward(&inputs).unwrap();

    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
    assert!(first.iter().all(|&o| o == 0.0 || o == 1.0));
}

#[test]
fn test_forward_rejects_wrong_input_width() {
    let mut network = NeuralNetwork::new(&[5, 6, 4]).unwrap();
    let result = network.forward(&Array1::zeros(3));

    assert_eq!(
        result.unwrap_err(),
        SimulationError::DimensionMismatch {
            expected: 5,
            actual: 3
        }
    );
}

#[test]
fn test_from_layers_checks_chaining() {
    let result = NeuralNetwork::from_layers(vec![Layer::new_random(5, 6), Layer::new_random(7, 4)]);
    assert_eq!(
        result.unwrap_err(),
        SimulationError::DimensionMismatch {
            expected: 6,
            actual: 7
        }
    );

    assert!(NeuralNetwork::from_layers(Vec::new()).is_err());
    assert!(
        NeuralNetwork::from_layers(vec![Layer::new_random(5, 6), Layer::new_random(6, 4)]).is_ok()
    );
}

#[test]
fn test_mutate_zero_keeps_parameters() {
    let mut network = NeuralNetwork::new(&[5, 6, 4]).unwrap();
    let before = parameters(&network);

    network.mutate(0.0);

    for (a, b) in before.iter().zip(parameters(&network)) {
        assert!((a - b).abs() < 1e-6);
    }
}

#[test]
fn test_mutate_one_replaces_parameters() {
    let mut network = NeuralNetwork::new(&[100, 100, 4]).unwrap();
    let before = parameters(&network);

    network.mutate(1.0);
    let after = parameters(&network);

    assert!(after.iter().all(|p| (-1.0..=1.0).contains(p)));

    let n = after.len() as f32;
    let mean = after.iter().sum::<f32>() / n;
    assert!(mean.abs() < 0.05, "mean of fresh draws was {mean}");

    // Fresh draws are uncorrelated with the old values
    let mean_before = before.iter().sum::<f32>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (a, b) in before.iter().zip(&after) {
        cov += (a - mean_before) * (b - mean);
        var_a += (a - mean_before).powi(2);
        var_b += (b - mean).powi(2);
    }
    let correlation = cov / (var_a.sqrt() * var_b.sqrt());
    assert!(correlation.abs() < 0.1, "correlation was {correlation}");
}

#[test]
fn test_partial_mutation_moves_part_way() {
    let network = NeuralNetwork::new(&[10, 10, 4]).unwrap();
    let child = network.mutated(0.25);

    // lerp(v, r, 0.25) stays within a quarter of the widest possible jump
    for (a, b) in parameters(&network).iter().zip(parameters(&child)) {
        assert!((a - b).abs() <= 0.5 + 1e-6);
        assert!((-1.0..=1.0).contains(&b));
    }
}

#[test]
fn test_mutated_leaves_parent_untouched() {
    let network = NeuralNetwork::new(&[5, 6, 4]).unwrap();
    let before = network.clone();

    let child = network.mutated(0.5);

    assert_eq!(network, before);
    assert_ne!(child, network);
    assert_eq!(child.neuron_counts(), network.neuron_counts());
}

#[test]
fn test_serialized_shape() {
    let mut network = NeuralNetwork::new(&[5, 6, 4]).unwrap();
    network.forward(&sample_inputs(5, 0.0)).unwrap();

    let value = serde_json::to_value(&network).unwrap();
    let levels = value["levels"].as_array().unwrap();

    assert_eq!(levels.len(), 2);
    assert_eq!(levels[0]["inputs"].as_array().unwrap().len(), 5);
    assert_eq!(levels[0]["outputs"].as_array().unwrap().len(), 6);
    assert_eq!(levels[0]["biases"].as_array().unwrap().len(), 6);

    let weights = levels[0]["weights"].as_array().unwrap();
    assert_eq!(weights.len(), 5);
    assert!(weights.iter().all(|row| row.as_array().unwrap().len() == 6));
}

#[test]
fn test_round_trip_preserves_behavior() {
    for topology in [vec![5, 4], vec![5, 6, 4], vec![3, 8, 8, 2]] {
        let mut network = NeuralNetwork::new(&topology).unwrap();
        let json = serde_json::to_string(&network).unwrap();
        let mut restored: NeuralNetwork = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.neuron_counts(), topology);
        for (a, b) in parameters(&network).iter().zip(parameters(&restored)) {
            assert!((a - b).abs() < 1e-6);
        }

        for phase in 0..10 {
            let inputs = sample_inputs(topology[0], phase as f32);
            assert_eq!(
                network.forward(&inputs).unwrap(),
                restored.forward(&inputs).unwrap()
            );
        }
    }
}

#[test]
fn test_deserialize_rejects_bad_weight_rows() {
    // three rows for two inputs
    let json = r#"{"levels":[{"inputs":[0,0],"outputs":[0],"biases":[0.1],"weights":[[0.1],[0.2],[0.3]]}]}"#;
    assert!(serde_json::from_str::<NeuralNetwork>(json).is_err());

    // row too wide for one output
    let json = r#"{"levels":[{"inputs":[0,0],"outputs":[0],"biases":[0.1],"weights":[[0.1,0.2],[0.3,0.4]]}]}"#;
    assert!(serde_json::from_str::<NeuralNetwork>(json).is_err());

    // bias count disagrees with outputs
    let json = r#"{"levels":[{"inputs":[0],"outputs":[0,0],"biases":[0.1],"weights":[[0.1,0.2]]}]}"#;
    assert!(serde_json::from_str::<NeuralNetwork>(json).is_err());
}

#[test]
fn test_deserialize_rejects_unchained_levels() {
    let json = r#"{"levels":[
        {"inputs":[0],"outputs":[0,0],"biases":[0.1,0.2],"weights":[[0.1,0.2]]},
        {"inputs":[0,0,0],"outputs":[0],"biases":[0.1],"weights":[[0.1],[0.2],[0.3]]}
    ]}"#;
    assert!(serde_json::from_str::<NeuralNetwork>(json).is_err());
}

#[test]
fn test_deserialize_accepts_hand_written_network() {
    let json = r#"{"levels":[{"inputs":[0,0],"outputs":[0],"biases":[0.5],"weights":[[1.0],[1.0]]}]}"#;
    let mut network: NeuralNetwork = serde_json::from_str(json).unwrap();

    assert_eq!(network.forward(&array![0.0, 0.0]).unwrap(), array![1.0_f32]);
    assert_eq!(network.forward(&array![1.0, 0.0]).unwrap(), array![0.0_f32]);
}
