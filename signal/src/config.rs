//! Configuration of an experiment.
use crate::Model;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use signal_candle_agent::{mlp::MlpConfig, DqnModelConfig};
use signal_core::{
    intersection::IntersectionConfig, replay_buffer::MemoryConfig, IntersectionController,
    TrainerConfig,
};
use signal_sumo_env::{RouteGeneratorConfig, SumoConfig};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Name of the copy of the configuration in a model directory.
pub const CONFIG_FILE: &str = "experiment.yaml";

/// Configuration of one intersection controller.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ControllerConfig {
    /// Roads, traffic lights and state encoding.
    pub intersection: IntersectionConfig,

    /// Experience memory.
    pub memory: MemoryConfig,

    /// Q-network.
    pub model: DqnModelConfig<MlpConfig>,
}

/// Configuration of an experiment.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ExperimentConfig {
    /// Training loop.
    pub trainer: TrainerConfig,

    /// SUMO process.
    pub sumo: SumoConfig,

    /// Traffic demand.
    pub routes: RouteGeneratorConfig,

    /// One entry per intersection.
    pub controllers: Vec<ControllerConfig>,

    /// Traffic seed of the test episode.
    pub test_seed: u64,

    /// Directory holding the numbered model directories.
    pub model_base_dir: PathBuf,
}

impl ExperimentConfig {
    /// Sets the number of training episodes.
    pub fn total_episodes(mut self, v: usize) -> Self {
        self.trainer.total_episodes = v;
        self
    }

    /// Sets the step budget of the trainer, the simulator and the route generator.
    pub fn max_steps(mut self, v: u32) -> Self {
        self.trainer.max_steps = v;
        self.sumo.max_steps = v;
        self.routes.max_steps = v;
        self
    }

    /// Sets the model base directory.
    pub fn model_base_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.model_base_dir = v.into();
        self
    }

    /// Checks that the parts of the configuration agree with each other.
    pub fn validate(&self) -> Result<()> {
        let max_steps = self.trainer.max_steps;
        if self.sumo.max_steps != max_steps || self.routes.max_steps != max_steps {
            bail!(
                "Step budgets differ: trainer {}, sumo {}, routes {}",
                max_steps,
                self.sumo.max_steps,
                self.routes.max_steps
            );
        }
        if self.controllers.is_empty() {
            bail!("No intersection is configured");
        }
        for c in self.controllers.iter() {
            c.intersection.validate()?;
            let q = &c.model.q_config;
            if q.in_dim() != c.intersection.state_dim() {
                bail!(
                    "{}: the model takes {} inputs, the state has {} cells",
                    c.intersection.name,
                    q.in_dim(),
                    c.intersection.state_dim()
                );
            }
            if q.out_dim() != c.intersection.n_actions() {
                bail!(
                    "{}: the model has {} outputs for {} actions",
                    c.intersection.name,
                    q.out_dim(),
                    c.intersection.n_actions()
                );
            }
        }
        Ok(())
    }

    /// Builds the controllers with freshly initialized models.
    pub fn build_controllers(&self) -> Result<Vec<IntersectionController<Model>>> {
        self.controllers
            .iter()
            .map(|c| {
                let model = Model::build(c.model.clone())?;
                IntersectionController::build(c.intersection.clone(), &c.memory, model)
            })
            .collect()
    }

    /// Constructs [`ExperimentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ExperimentConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
