//! Evaluate trained controllers.
use crate::{
    intersection::{IntersectionController, PhaseTiming},
    simulation::{EpisodeStats, Simulation},
    QNetwork, Simulator, TrafficGenerator,
};
use anyhow::Result;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, path::Path, time::Instant};

/// Result of an evaluation episode.
#[derive(Debug, Clone)]
pub struct EvaluationResult {
    /// Statistics of the episode.
    pub stats: EpisodeStats,

    /// Rewards per decision, one series per intersection. The first decision of an
    /// episode is included.
    pub rewards: Vec<Vec<f32>>,

    /// Halting vehicles on monitored roads, one value per step.
    pub queue_per_step: Vec<u32>,
}

impl EvaluationResult {
    /// Writes `stats.csv`, `reward_{i}.csv` (1-based) and `queue.csv` into `dir`.
    pub fn write_csv(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        EpisodeStats::write_csv(&[self.stats.clone()], dir.join("stats.csv"))?;

        for (i, rewards) in self.rewards.iter().enumerate() {
            let mut wtr = csv::Writer::from_path(dir.join(format!("reward_{}.csv", i + 1)))?;
            wtr.write_record(["decision", "reward"])?;
            for (j, r) in rewards.iter().enumerate() {
                wtr.write_record([j.to_string(), r.to_string()])?;
            }
            wtr.flush()?;
        }

        let mut wtr = csv::Writer::from_path(dir.join("queue.csv"))?;
        wtr.write_record(["step", "queue_length"])?;
        for (j, q) in self.queue_per_step.iter().enumerate() {
            wtr.write_record([j.to_string(), q.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Runs a greedy episode: epsilon is 0, nothing is stored and nothing is trained.
pub struct Evaluator {
    simulation: Simulation,
    seed: u64,
}

impl Evaluator {
    /// Constructs an evaluator. `seed` is passed to the traffic generator.
    pub fn new(max_steps: u32, timing: PhaseTiming, seed: u64) -> Result<Self> {
        Ok(Self {
            simulation: Simulation::new(max_steps, timing)?,
            seed,
        })
    }

    /// Evaluates the controllers.
    pub fn evaluate<S, G, Q>(
        &mut self,
        sim: &mut S,
        generator: &mut G,
        controllers: &mut [IntersectionController<Q>],
    ) -> Result<EvaluationResult>
    where
        S: Simulator,
        G: TrafficGenerator,
        Q: QNetwork,
    {
        info!("Starts evaluation with traffic seed {}", self.seed);
        let timer = Instant::now();
        generator.generate(self.seed)?;
        sim.start()?;
        // epsilon 0 never explores
        let mut rng = StdRng::seed_from_u64(self.seed);
        let summary = self
            .simulation
            .run(sim, controllers, 0.0, false, &mut rng)?;
        sim.close()?;

        let mut stats = EpisodeStats::new(0, 0.0, &summary);
        stats.simulation_secs = timer.elapsed().as_secs_f64();
        info!(
            "Negative rewards {:?}, avg queue length {:.2}",
            stats.neg_rewards, stats.avg_queue_length
        );

        Ok(EvaluationResult {
            stats,
            rewards: summary.rewards,
            queue_per_step: summary.queue_per_step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{DummyGenerator, DummySimulator, SequenceQNetwork},
        intersection::IntersectionConfig,
        replay_buffer::MemoryConfig,
        ExperienceBufferBase,
    };
    use tempdir::TempDir;

    #[test]
    fn test_evaluate_stores_nothing() -> Result<()> {
        let config = IntersectionConfig::default()
            .name("single")
            .roads(["E2", "E3", "E4"])
            .traffic_lights(["tl_01", "tl_02", "tl_03"]);
        let memory = MemoryConfig::default().min_size(1);
        let mut controllers = vec![IntersectionController::build(
            config,
            &memory,
            SequenceQNetwork::new(vec![0, 1, 2], 3),
        )?];
        let mut generator = DummyGenerator::default();
        let mut evaluator = Evaluator::new(60, PhaseTiming::default(), 10_000)?;
        let result = evaluator.evaluate(&mut DummySimulator::default(), &mut generator, &mut controllers)?;

        assert_eq!(generator.seeds, vec![10_000]);
        assert_eq!(controllers[0].memory().len(), 0);
        assert_eq!(result.queue_per_step.len(), 60);
        // decisions at steps 0, 10, 24, 38 and 52, the first one included
        assert_eq!(result.rewards[0], vec![0.0; 5]);

        let dir = TempDir::new("evaluation")?;
        result.write_csv(dir.path().join("test"))?;
        let rdr = csv::Reader::from_path(dir.path().join("test/reward_1.csv"))?;
        assert_eq!(rdr.into_records().count(), 5);
        assert!(dir.path().join("test/queue.csv").is_file());
        Ok(())
    }
}
