//! Preset experiments.
use crate::{ControllerConfig, ExperimentConfig};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use signal_candle_agent::{mlp::MlpConfig, opt::OptimizerConfig, DqnModelConfig};
use signal_core::{intersection::IntersectionConfig, replay_buffer::MemoryConfig, TrainerConfig};
use signal_sumo_env::{RouteGeneratorConfig, SumoConfig, Topology};
use std::path::PathBuf;

const MAX_STEPS: u32 = 5400;
const N_VEHICLES: usize = 1000;
const NUM_LAYERS: usize = 4;
const WIDTH: usize = 400;
const BATCH_SIZE: usize = 100;
const LEARNING_RATE: f64 = 0.001;
const TEST_SEED: u64 = 10_000;
const MEMORY_SEED: u64 = 42;
const DUAL_BUCKET_BOUNDS: [f64; 9] = [10.0, 20.0, 35.0, 55.0, 80.0, 110.0, 145.0, 215.0, 350.0];

/// Experiment variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
pub enum Variant {
    /// One intersection with three approaches and occupancy-only state.
    Single,

    /// Two coordinated intersections with occupancy and speed state.
    Dual,
}

/// Controller `index` of an experiment. Memories draw from distinct seeds.
fn controller(intersection: IntersectionConfig, index: usize) -> ControllerConfig {
    let q_config = MlpConfig::uniform(
        intersection.state_dim(),
        NUM_LAYERS,
        WIDTH,
        intersection.n_actions(),
    );
    ControllerConfig {
        intersection,
        memory: MemoryConfig::default().seed(MEMORY_SEED + index as u64),
        model: DqnModelConfig::new(q_config)
            .opt_config(OptimizerConfig::default().learning_rate(LEARNING_RATE))
            .batch_size(BATCH_SIZE),
    }
}

impl ExperimentConfig {
    /// Default configuration of a variant.
    pub fn preset(variant: Variant) -> Self {
        let (controllers, topology, sumocfg) = match variant {
            Variant::Single => {
                let intersection = IntersectionConfig::default()
                    .name("single")
                    .roads(["E2", "E3", "E4"])
                    .traffic_lights(["tl_01", "tl_02", "tl_03"]);
                (
                    vec![controller(intersection, 0)],
                    Topology::Single,
                    "intersection/sumo_config.sumocfg",
                )
            }
            Variant::Dual => {
                let base = IntersectionConfig::default()
                    .lane_length(500.0)
                    .bucket_bounds(DUAL_BUCKET_BOUNDS.to_vec())
                    .speed_block(true);
                let first = base
                    .clone()
                    .name("intersection_1")
                    .roads(["E1", "E2", "E3"])
                    .traffic_lights(["tl_01", "tl_02", "tl_03"]);
                let second = base
                    .name("intersection_2")
                    .roads(["E4", "E5", "E6", "E7"])
                    .traffic_lights(["tl_04", "tl_05", "tl_06", "tl_07"]);
                (
                    vec![controller(first, 0), controller(second, 1)],
                    Topology::Dual,
                    "intersection/bursa.sumocfg",
                )
            }
        };

        let routes = RouteGeneratorConfig::default()
            .n_vehicles(N_VEHICLES)
            .topology(topology)
            .route_file(PathBuf::from(sumocfg).with_file_name("episode_routes.rou.xml"));

        Self {
            trainer: TrainerConfig::default(),
            sumo: SumoConfig::default().sumocfg(sumocfg),
            routes,
            controllers,
            test_seed: TEST_SEED,
            model_base_dir: PathBuf::from("models"),
        }
        .max_steps(MAX_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_and_action_dims() {
        let single = ExperimentConfig::preset(Variant::Single);
        assert_eq!(single.controllers.len(), 1);
        assert_eq!(single.controllers[0].intersection.state_dim(), 30);
        assert_eq!(single.controllers[0].model.q_config.out_dim(), 3);

        let dual = ExperimentConfig::preset(Variant::Dual);
        let dims: Vec<(usize, usize)> = dual
            .controllers
            .iter()
            .map(|c| (c.intersection.state_dim(), c.intersection.n_actions()))
            .collect();
        assert_eq!(dims, vec![(60, 3), (80, 4)]);
        assert_eq!(dual.routes.topology, Topology::Dual);
        assert_eq!(dual.trainer.gamma, 0.75);
        assert_eq!(dual.controllers[1].memory.min_size, 600);
        assert_ne!(
            dual.controllers[0].memory.seed,
            dual.controllers[1].memory.seed
        );
    }
}
