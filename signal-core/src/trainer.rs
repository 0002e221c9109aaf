//! Train intersection controllers.
mod config;
use crate::{
    intersection::IntersectionController,
    record::Recorder,
    simulation::{EpisodeStats, Simulation},
    QNetwork, Simulator, TrafficGenerator,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::{path::Path, time::Instant};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// # Training loop
///
/// For every episode `e` in `0..total_episodes`:
///
/// 1. Compute epsilon of the episode from the linear schedule of
///    [`EpsilonGreedy`](crate::EpsilonGreedy).
/// 2. Generate the traffic demand with seed `e` and start the simulator.
/// 3. Run the episode with [`Simulation::run`]. Controllers store transitions in their
///    memories at every decision but the first.
/// 4. Close the simulator.
/// 5. Run `training_epochs` replay passes for every controller. A pass does nothing
///    while the memory of the controller is below its minimum size.
/// 6. Write the statistics of the episode to the recorder and append them to the history.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     G[TrafficGenerator]-->|route file|S[Simulator]
///     S -->|state, waiting time|C[IntersectionController]
///     C -->|phase|S
///     C -->|Transition|M[Memory]
///     M -->|batch|Q[QNetwork]
///     Q -->|Q-values|C
/// ```
pub struct Trainer {
    config: TrainerConfig,
    rng: StdRng,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Configuration of the trainer.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Trains the controllers and returns the history of episode statistics.
    pub fn train<S, G, Q>(
        &mut self,
        sim: &mut S,
        generator: &mut G,
        controllers: &mut [IntersectionController<Q>],
        recorder: &mut dyn Recorder,
    ) -> Result<Vec<EpisodeStats>>
    where
        S: Simulator,
        G: TrafficGenerator,
        Q: QNetwork,
    {
        let simulation = Simulation::new(self.config.max_steps, self.config.timing)?;
        let n_episodes = self.config.total_episodes;
        let mut history = Vec::with_capacity(n_episodes);

        for episode in 0..n_episodes {
            let eps = self.config.explorer.epsilon(episode, n_episodes);
            info!("Episode {} of {}, epsilon {:.3}", episode + 1, n_episodes, eps);

            let timer = Instant::now();
            generator.generate(episode as u64)?;
            sim.start()?;
            let summary = simulation.run(sim, controllers, eps, true, &mut self.rng)?;
            sim.close()?;
            let simulation_secs = timer.elapsed().as_secs_f64();

            let mut training_secs = Vec::with_capacity(controllers.len());
            for c in controllers.iter_mut() {
                let timer = Instant::now();
                for _ in 0..self.config.training_epochs {
                    c.replay(self.config.gamma)?;
                }
                training_secs.push(timer.elapsed().as_secs_f64());
            }

            let mut stats = EpisodeStats::new(episode, eps, &summary);
            stats.simulation_secs = simulation_secs;
            stats.training_secs = training_secs;
            info!(
                "Negative rewards {:?}, avg queue length {:.2}, simulation {:.1}s, training {:?}s",
                stats.neg_rewards, stats.avg_queue_length, stats.simulation_secs, stats.training_secs
            );

            recorder.write(stats.to_record());
            history.push(stats);
        }
        recorder.flush();

        Ok(history)
    }

    /// Saves the model of every controller as `trained_model_{i}` (1-based) in `dir`.
    pub fn save_models<Q: QNetwork>(
        dir: impl AsRef<Path>,
        controllers: &[IntersectionController<Q>],
    ) -> Result<()> {
        for (i, c) in controllers.iter().enumerate() {
            c.model().save(dir.as_ref(), &model_name(i))?;
        }
        info!("Saved {} models in {:?}", controllers.len(), dir.as_ref());
        Ok(())
    }

    /// Loads the model of every controller saved with [`Trainer::save_models`].
    pub fn load_models<Q: QNetwork>(
        dir: impl AsRef<Path>,
        controllers: &mut [IntersectionController<Q>],
    ) -> Result<()> {
        for (i, c) in controllers.iter_mut().enumerate() {
            c.model_mut().load(dir.as_ref(), &model_name(i))?;
        }
        Ok(())
    }
}

/// Name of the saved model of the `i`-th (0-based) controller.
pub fn model_name(i: usize) -> String {
    format!("trained_model_{}", i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{ConstantQNetwork, DummyGenerator, DummySimulator, DummyVehicle},
        error::SignalError,
        intersection::IntersectionConfig,
        record::BufferedRecorder,
        replay_buffer::MemoryConfig,
        ExperienceBufferBase,
    };
    use tempdir::TempDir;

    fn controller(min_size: usize) -> Result<IntersectionController<ConstantQNetwork>> {
        let config = IntersectionConfig::default()
            .name("single")
            .roads(["E2", "E3", "E4"])
            .traffic_lights(["tl_01", "tl_02", "tl_03"]);
        let memory = MemoryConfig::default().capacity(1000).min_size(min_size);
        IntersectionController::build(config, &memory, ConstantQNetwork::new(vec![0.0, 0.0, 0.0], 8))
    }

    fn sim() -> DummySimulator {
        DummySimulator::new(vec![DummyVehicle::new("bus_0", "bus", "E2")]).on_step(
            |step, vehicles| vehicles[0].waiting_time = step as f64,
        )
    }

    #[test]
    fn test_no_training_below_min_size() -> Result<()> {
        let config = TrainerConfig::default()
            .total_episodes(2)
            .max_steps(100)
            .training_epochs(5);
        let mut controllers = vec![controller(1000)?];
        let mut sim = sim();
        let mut generator = DummyGenerator::default();
        let mut recorder = BufferedRecorder::new();
        let history = Trainer::build(config).train(
            &mut sim,
            &mut generator,
            &mut controllers,
            &mut recorder,
        )?;

        assert_eq!(history.len(), 2);
        assert_eq!(recorder.len(), 2);
        assert_eq!(generator.seeds, vec![0, 1]);
        assert_eq!((sim.n_starts(), sim.n_closes()), (2, 2));
        assert!(controllers[0].memory().len() > 0);
        assert_eq!(controllers[0].model().n_train_calls(), 0);
        Ok(())
    }

    #[test]
    fn test_training_passes() -> Result<()> {
        let config = TrainerConfig::default()
            .total_episodes(3)
            .max_steps(100)
            .training_epochs(5);
        let mut controllers = vec![controller(1)?];
        let history = Trainer::build(config).train(
            &mut sim(),
            &mut DummyGenerator::default(),
            &mut controllers,
            &mut BufferedRecorder::new(),
        )?;
        assert_eq!(controllers[0].model().n_train_calls(), 15);
        assert_eq!(history[0].epsilon, 1.0);
        assert!(history[0].neg_rewards[0] < 0.0);
        Ok(())
    }

    #[test]
    fn test_save_and_load_models() -> Result<()> {
        let dir = TempDir::new("trainer_models")?;
        let controllers = vec![controller(1)?];
        Trainer::save_models(dir.path(), &controllers)?;
        assert!(dir.path().join("trained_model_1.yaml").is_file());

        let mut controllers = vec![controller(1)?, controller(1)?];
        let err = Trainer::load_models(dir.path(), &mut controllers).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SignalError>(),
            Some(SignalError::ModelNotFound(_))
        ));
        Ok(())
    }
}
