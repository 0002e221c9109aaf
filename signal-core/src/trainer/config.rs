//! Configuration of [`Trainer`](super::Trainer).
use crate::{explorer::EpsilonGreedy, intersection::PhaseTiming};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of training episodes.
    pub total_episodes: usize,

    /// The number of simulation steps of an episode.
    pub max_steps: u32,

    /// Durations of the green and yellow phases.
    pub timing: PhaseTiming,

    /// The number of replay passes per intersection after each episode.
    pub training_epochs: usize,

    /// Discount factor.
    pub gamma: f32,

    /// Schedule of the exploration rate.
    pub explorer: EpsilonGreedy,

    /// Seed of the random number generator used for exploration.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            total_episodes: 100,
            max_steps: 5400,
            timing: PhaseTiming::default(),
            training_epochs: 800,
            gamma: 0.75,
            explorer: EpsilonGreedy::default(),
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn total_episodes(mut self, v: usize) -> Self {
        self.total_episodes = v;
        self
    }

    /// Sets the number of simulation steps of an episode.
    pub fn max_steps(mut self, v: u32) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the green and yellow durations.
    pub fn timing(mut self, green: u32, yellow: u32) -> Self {
        self.timing = PhaseTiming { green, yellow };
        self
    }

    /// Sets the number of replay passes per episode.
    pub fn training_epochs(mut self, v: usize) -> Self {
        self.training_epochs = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the exploration schedule.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
