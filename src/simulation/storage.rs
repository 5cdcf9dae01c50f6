//! Persistence boundary for seed networks.
//!
//! The core only needs to get, set and remove a serialized network under a
//! key; where the bytes end up is up to the implementor.

use std::collections::HashMap;

use thiserror::Error;

use super::brain::NeuralNetwork;
use super::error::SimulationError;

/// Key under which the best network is conventionally stored.
pub const BEST_NETWORK_KEY: &str = "bestBrain";

/// Errors raised while persisting or restoring state.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The stored blob is not valid JSON for the requested type.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// The stored value parsed but is not a usable simulation value.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

/// Get/set/delete access to serialized networks.
pub trait NetworkStore {
    /// Loads the network stored under `key`, if there is one.
    fn load(&self, key: &str) -> Result<Option<NeuralNetwork>, StorageError>;

    /// Stores `network` under `key`, replacing any previous value.
    fn save(&mut self, key: &str, network: &NeuralNetwork) -> Result<(), StorageError>;

    /// Removes whatever is stored under `key`.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// A store that keeps JSON blobs in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON stored under `key`.
    pub fn blob(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }

    /// Stores a raw JSON blob, as another process might have written it.
    pub fn insert_blob(&mut self, key: &str, json: impl Into<String>) {
        self.blobs.insert(key.to_owned(), json.into());
    }
}

impl NetworkStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<NeuralNetwork>, StorageError> {
        self.blobs
            .get(key)
            .map(|json| NeuralNetwork::from_json(json))
            .transpose()
    }

    fn save(&mut self, key: &str, network: &NeuralNetwork) -> Result<(), StorageError> {
        let json = serde_json::to_string(network)?;
        self.blobs.insert(key.to_owned(), json);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.blobs.remove(key);
        Ok(())
    }
}
