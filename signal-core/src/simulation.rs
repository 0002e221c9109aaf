//! Episode runner.
mod stats;
use crate::{
    intersection::{IntersectionController, PhaseTiming},
    QNetwork, Simulator,
};
use anyhow::{bail, Result};
use rand::Rng;
pub(crate) use stats::StepStats;
pub use stats::{EpisodeStats, EpisodeSummary};

/// Runs episodes of one or more intersection controllers in lock step.
///
/// Each controller keeps its own countdown. The simulator is advanced by the
/// smallest remaining countdown, so no controller misses the step at which its
/// countdown expires. The episode ends after `max_steps` simulated steps.
pub struct Simulation {
    max_steps: u32,
    timing: PhaseTiming,
}

impl Simulation {
    /// Constructs the runner.
    pub fn new(max_steps: u32, timing: PhaseTiming) -> Result<Self> {
        if timing.green == 0 {
            bail!("The green duration must be at least one step");
        }
        Ok(Self { max_steps, timing })
    }

    /// Step budget of an episode.
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Runs one episode on a started simulator.
    ///
    /// `eps` is the exploration rate of every controller. When `learn` is `false`
    /// no transition is stored.
    pub fn run<S, Q, R>(
        &self,
        sim: &mut S,
        controllers: &mut [IntersectionController<Q>],
        eps: f64,
        learn: bool,
        rng: &mut R,
    ) -> Result<EpisodeSummary>
    where
        S: Simulator,
        Q: QNetwork,
        R: Rng,
    {
        let mut roads: Vec<String> = vec![];
        for c in controllers.iter_mut() {
            c.reset();
            for road in c.config().roads.iter() {
                if !roads.contains(road) {
                    roads.push(road.clone());
                }
            }
        }
        let mut stats = StepStats::new(roads);
        let mut step = 0;

        while step < self.max_steps {
            for c in controllers.iter_mut() {
                while c.remaining() == 0 {
                    c.advance(sim, &self.timing, eps, learn, rng)?;
                }
            }

            let budget = self.max_steps - step;
            let todo = controllers
                .iter()
                .map(|c| c.remaining())
                .min()
                .unwrap_or(budget)
                .min(budget);

            for _ in 0..todo {
                sim.simulation_step()?;
                stats.observe(sim)?;
            }
            step += todo;

            for c in controllers.iter_mut() {
                c.elapse(todo);
            }
        }

        let max_steps = self.max_steps.max(1) as f64;
        Ok(EpisodeSummary {
            neg_rewards: controllers.iter().map(|c| c.neg_reward()).collect(),
            rewards: controllers.iter().map(|c| c.rewards().to_vec()).collect(),
            cumulative_wait: stats.wait_sum,
            cumulative_wait_bus_taxi: stats.public_wait_sum,
            avg_queue_length: stats.queue_sum() as f64 / max_steps,
            queue_per_step: stats.queue_per_step,
            co2: stats.co2_sum,
            mean_speed: stats.speed_sum / max_steps,
            noise: stats.noise_sum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{ConstantQNetwork, DummySimulator, DummyVehicle, SequenceQNetwork},
        intersection::IntersectionConfig,
        replay_buffer::MemoryConfig,
        ExperienceBufferBase,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn first() -> IntersectionConfig {
        IntersectionConfig::default()
            .name("first")
            .roads(["E1", "E2", "E3"])
            .traffic_lights(["tl_01", "tl_02", "tl_03"])
    }

    fn second() -> IntersectionConfig {
        IntersectionConfig::default()
            .name("second")
            .roads(["E4", "E5", "E6", "E7"])
            .traffic_lights(["tl_04", "tl_05", "tl_06", "tl_07"])
    }

    #[test]
    fn test_steps_never_exceed_budget() -> Result<()> {
        let simulation = Simulation::new(25, PhaseTiming { green: 10, yellow: 4 })?;
        let model = ConstantQNetwork::new(vec![1.0, 0.0, 0.0], 4);
        let mut controllers = vec![IntersectionController::build(
            first(),
            &MemoryConfig::default(),
            model,
        )?];
        let mut sim = DummySimulator::default();
        let mut rng = StdRng::seed_from_u64(0);
        let summary = simulation.run(&mut sim, &mut controllers, 0.0, true, &mut rng)?;
        assert_eq!(sim.step(), 25);
        assert_eq!(summary.queue_per_step.len(), 25);
        // decisions at steps 0, 10 and 20
        assert_eq!(controllers[0].rewards().len(), 3);
        Ok(())
    }

    #[test]
    fn test_lock_step_co_scheduling() -> Result<()> {
        let timing = PhaseTiming { green: 10, yellow: 4 };
        let simulation = Simulation::new(40, timing)?;
        let mut controllers = vec![
            IntersectionController::build(
                first(),
                &MemoryConfig::default(),
                SequenceQNetwork::new(vec![0], 3),
            )?,
            IntersectionController::build(
                second(),
                &MemoryConfig::default(),
                SequenceQNetwork::new(vec![0, 1], 4),
            )?,
        ];
        let mut sim = DummySimulator::default();
        let mut rng = StdRng::seed_from_u64(0);
        simulation.run(&mut sim, &mut controllers, 0.0, true, &mut rng)?;

        let steps_of = |tls: &str, phase: u32| -> Vec<u32> {
            sim.phase_log()
                .iter()
                .filter(|(_, t, p)| t == tls && *p == phase)
                .map(|(s, _, _)| *s)
                .collect()
        };
        // the first intersection keeps action 0: green every 10 steps
        assert_eq!(steps_of("tl_01", 0), vec![0, 10, 20, 30]);
        assert!(steps_of("tl_01", 1).is_empty());
        // the second alternates: yellow at 10, green at 14, decision at 24, ...
        assert_eq!(steps_of("tl_04", 1), vec![10, 38]);
        assert_eq!(steps_of("tl_05", 1), vec![24]);
        assert_eq!(steps_of("tl_05", 0), vec![14]);
        assert_eq!(steps_of("tl_04", 0), vec![0, 28]);
        Ok(())
    }

    #[test]
    fn test_statistics() -> Result<()> {
        let simulation = Simulation::new(4, PhaseTiming::default())?;
        let mut controllers = vec![IntersectionController::build(
            first(),
            &MemoryConfig::default(),
            ConstantQNetwork::new(vec![1.0, 0.0, 0.0], 4),
        )?];
        let mut sim = DummySimulator::new(vec![
            DummyVehicle::new("car_0", "standart_car", "E1")
                .waiting_time(2.0)
                .emissions(100.0, 50.0),
            DummyVehicle::new("car_1", "standart_car", "E9")
                .waiting_time(7.0)
                .emissions(300.0, 70.0),
        ]);
        sim.halting.insert("E1".to_string(), 1);
        sim.halting.insert("E2".to_string(), 2);
        sim.mean_speed.insert("E3".to_string(), 6.0);
        let mut rng = StdRng::seed_from_u64(0);
        let summary = simulation.run(&mut sim, &mut controllers, 0.0, true, &mut rng)?;

        assert_eq!(summary.queue_per_step, vec![3, 3, 3, 3]);
        assert_eq!(summary.avg_queue_length, 3.0);
        assert_eq!(summary.cumulative_wait, 8.0);
        assert_eq!(summary.cumulative_wait_bus_taxi, 0.0);
        assert_eq!(summary.co2, 400.0);
        assert_eq!(summary.noise, 200.0);
        assert_eq!(summary.mean_speed, 6.0);
        // private cars contribute nothing to the reward
        assert_eq!(summary.neg_rewards, vec![0.0]);
        assert_eq!(controllers[0].memory().len(), 0);
        Ok(())
    }

    #[test]
    fn test_bus_and_taxi_waiting() -> Result<()> {
        let simulation = Simulation::new(4, PhaseTiming::default())?;
        let mut controllers = vec![IntersectionController::build(
            first(),
            &MemoryConfig::default(),
            ConstantQNetwork::new(vec![1.0, 0.0, 0.0], 4),
        )?];
        let mut sim = DummySimulator::new(vec![
            DummyVehicle::new("bus_0", "bus", "E1").waiting_time(3.0),
            DummyVehicle::new("taxi_0", "taxi", "E2").waiting_time(1.0),
            DummyVehicle::new("car_0", "standart_car", "E3").waiting_time(5.0),
            DummyVehicle::new("bus_1", "bus", "E9").waiting_time(100.0),
        ]);
        let mut rng = StdRng::seed_from_u64(0);
        let summary = simulation.run(&mut sim, &mut controllers, 0.0, true, &mut rng)?;

        // unweighted, monitored roads only
        assert_eq!(summary.cumulative_wait_bus_taxi, 16.0);
        assert_eq!(summary.cumulative_wait, 36.0);

        let stats = EpisodeStats::new(0, 0.0, &summary);
        assert_eq!(stats.cumulative_wait_bus_taxi, 16.0);
        assert_eq!(
            stats.to_record().get_scalar("cumulative_wait_bus_taxi").unwrap(),
            16.0
        );
        Ok(())
    }
}
