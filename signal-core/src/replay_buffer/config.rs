//! Configuration of [`Memory`](super::Memory).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Memory`](super::Memory).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MemoryConfig {
    /// The maximum number of transitions. The oldest one is evicted beyond it.
    pub capacity: usize,

    /// Sampling returns nothing while the memory holds fewer transitions.
    pub min_size: usize,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 50000,
            min_size: 600,
            seed: 42,
        }
    }
}

impl MemoryConfig {
    /// Sets the capacity of the memory.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the minimum number of transitions required for sampling.
    pub fn min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Constructs [`MemoryConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MemoryConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
