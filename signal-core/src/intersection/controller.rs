//! Controller of a single intersection.
use super::{IntersectionConfig, StateEncoder, VehicleClass, VehicleLedger};
use crate::{
    error::SignalError,
    explorer::EpsilonGreedy,
    replay_buffer::{Memory, MemoryConfig, Transition},
    ExperienceBufferBase, QNetwork, ReplayBufferBase, Simulator,
};
use anyhow::Result;
use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Durations of the signal phases in simulation steps.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub struct PhaseTiming {
    /// Duration of a green phase.
    pub green: u32,

    /// Duration of a yellow phase.
    pub yellow: u32,
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            green: 10,
            yellow: 4,
        }
    }
}

/// Phase of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPhase {
    /// No decision has been made in this episode.
    Choosing,

    /// Yellow on the light of the previous action; green for `next` follows.
    Yellow {
        /// The action that gets green when the yellow phase ends.
        next: usize,
    },

    /// Green on the light of the current action.
    Green,
}

struct Decision {
    state: Vec<f32>,
    action: usize,
}

/// Controller of a single intersection.
///
/// The controller cycles `Choosing -> (Yellow)? -> Green -> Choosing` on its own
/// countdown. When the countdown of a green phase (or the episode start) expires,
/// it makes a decision:
///
/// 1. Encodes the state and refreshes the weighted waiting-time ledger of the
///    incoming roads. The reward of the action that was executing is
///    `previous total - current total`.
/// 2. Stores `(previous state, previous action, reward, state)` in its memory,
///    except at the first decision of an episode or when not learning.
/// 3. Chooses the next action epsilon-greedily.
/// 4. Sets yellow on the previous action's light if the action changed, otherwise
///    green on the chosen light.
///
/// When a yellow countdown expires, green is set for the pending action without a
/// new decision.
pub struct IntersectionController<Q: QNetwork> {
    config: IntersectionConfig,
    encoder: StateEncoder,
    waiting: VehicleLedger,
    memory: Memory,
    model: Q,
    phase: SignalPhase,
    remaining: u32,
    previous: Option<Decision>,
    previous_total_wait: f64,
    neg_reward: f64,
    rewards: Vec<f32>,
}

impl<Q: QNetwork> IntersectionController<Q> {
    /// Constructs a controller.
    pub fn build(config: IntersectionConfig, memory_config: &MemoryConfig, model: Q) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            encoder: StateEncoder::new(&config),
            config,
            waiting: VehicleLedger::new(),
            memory: Memory::build(memory_config),
            model,
            phase: SignalPhase::Choosing,
            remaining: 0,
            previous: None,
            previous_total_wait: 0.0,
            neg_reward: 0.0,
            rewards: vec![],
        })
    }

    /// Prepares the controller for a new episode. Memory and model are kept.
    pub fn reset(&mut self) {
        self.waiting.clear();
        self.phase = SignalPhase::Choosing;
        self.remaining = 0;
        self.previous = None;
        self.previous_total_wait = 0.0;
        self.neg_reward = 0.0;
        self.rewards.clear();
    }

    /// Configuration of the intersection.
    pub fn config(&self) -> &IntersectionConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> SignalPhase {
        self.phase
    }

    /// Steps left before the controller acts again.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Counts down `steps` simulated steps.
    pub fn elapse(&mut self, steps: u32) {
        self.remaining = self.remaining.saturating_sub(steps);
    }

    /// Sum of the negative rewards of the episode.
    pub fn neg_reward(&self) -> f64 {
        self.neg_reward
    }

    /// Rewards of the episode, one per decision. The first one is measured against
    /// an empty ledger and is neither stored nor summed into [`Self::neg_reward`].
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// The action-value function.
    pub fn model(&self) -> &Q {
        &self.model
    }

    /// The action-value function.
    pub fn model_mut(&mut self) -> &mut Q {
        &mut self.model
    }

    /// The experience memory.
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Acts on the expiry of the countdown.
    ///
    /// `learn` controls whether transitions are stored in the memory.
    pub fn advance<S: Simulator, R: Rng>(
        &mut self,
        sim: &mut S,
        timing: &PhaseTiming,
        eps: f64,
        learn: bool,
        rng: &mut R,
    ) -> Result<()> {
        if let SignalPhase::Yellow { next } = self.phase {
            self.set_green(sim, next)?;
            self.phase = SignalPhase::Green;
            self.remaining = timing.green;
            return Ok(());
        }

        let state = self.encoder.encode(sim)?;
        let total_wait = self.refresh_waiting(sim)?;
        let reward = self.previous_total_wait - total_wait;
        self.previous_total_wait = total_wait;

        self.rewards.push(reward as f32);
        let previous_action = match self.previous.take() {
            Some(Decision {
                state: prev_state,
                action,
            }) => {
                if reward < 0.0 {
                    self.neg_reward += reward;
                }
                if learn {
                    self.memory.push(Transition::new(
                        prev_state,
                        action,
                        reward as f32,
                        state.clone(),
                    ))?;
                }
                Some(action)
            }
            None => None,
        };

        let action = self.choose_action(&state, eps, rng)?;
        debug!(
            "{}: action {} (previous {:?}), reward {:.1}",
            self.config.name, action, previous_action, reward
        );

        match previous_action {
            Some(prev) if prev != action => {
                self.set_yellow(sim, prev)?;
                self.phase = SignalPhase::Yellow { next: action };
                self.remaining = timing.yellow;
            }
            _ => {
                self.set_green(sim, action)?;
                self.phase = SignalPhase::Green;
                self.remaining = timing.green;
            }
        }

        self.previous = Some(Decision { state, action });
        Ok(())
    }

    /// Runs a replay pass and returns the loss, or `None` if the memory gave no batch.
    ///
    /// The target of a transition is the predicted Q-vector of its state with the
    /// entry of the taken action replaced by `reward + gamma * max Q(next_state)`.
    pub fn replay(&mut self, gamma: f32) -> Result<Option<f32>> {
        let batch = self.memory.batch(self.model.batch_size())?;
        if batch.is_empty() {
            return Ok(None);
        }

        let states: Vec<Vec<f32>> = batch.iter().map(|t| t.state.clone()).collect();
        let next_states: Vec<Vec<f32>> = batch.iter().map(|t| t.next_state.clone()).collect();
        let q = self.model.predict_batch(&states)?;
        let q_next = self.model.predict_batch(&next_states)?;

        let mut targets = Vec::with_capacity(batch.len());
        for ((t, mut row), next) in batch.iter().zip(q).zip(q_next.iter()) {
            if t.action >= row.len() {
                return Err(self.invalid_action(t.action).into());
            }
            let max_next = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            row[t.action] = t.reward + gamma * max_next;
            targets.push(row);
        }

        let loss = self.model.train_batch(&states, &targets)?;
        trace!("{}: replay loss {}", self.config.name, loss);
        Ok(Some(loss))
    }

    fn choose_action<R: Rng>(&self, state: &[f32], eps: f64, rng: &mut R) -> Result<usize> {
        let q = self.model.predict_one(state)?;
        if q.len() != self.config.n_actions() {
            return Err(SignalError::Dimension {
                expected: self.config.n_actions(),
                got: q.len(),
            }
            .into());
        }
        Ok(EpsilonGreedy::action(&q, eps, rng))
    }

    /// Refreshes the weighted waiting times of buses and taxis on the incoming roads.
    fn refresh_waiting<S: Simulator>(&mut self, sim: &mut S) -> Result<f64> {
        let ids = sim.vehicle_ids()?;
        for id in ids.iter() {
            let weight = VehicleClass::from_type_id(&sim.vehicle_type(id)?).reward_weight();
            if weight == 0.0 {
                continue;
            }
            let road = sim.vehicle_road(id)?;
            if self.config.roads.contains(&road) {
                let wait = sim.vehicle_accumulated_waiting_time(id)?;
                self.waiting.insert(id, wait * weight);
            } else {
                self.waiting.remove(id);
            }
        }
        let present: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.waiting.retain_present(&present);
        Ok(self.waiting.total())
    }

    fn set_green<S: Simulator>(&self, sim: &mut S, action: usize) -> Result<()> {
        if action >= self.config.n_actions() {
            return Err(self.invalid_action(action).into());
        }
        for (i, tls) in self.config.traffic_lights.iter().enumerate() {
            let phase = if i == action {
                self.config.green_phase
            } else {
                self.config.red_phase
            };
            sim.set_phase(tls, phase)?;
        }
        Ok(())
    }

    fn set_yellow<S: Simulator>(&self, sim: &mut S, action: usize) -> Result<()> {
        match self.config.traffic_lights.get(action) {
            Some(tls) => sim.set_phase(tls, self.config.yellow_phase),
            None => Err(self.invalid_action(action).into()),
        }
    }

    fn invalid_action(&self, action: usize) -> SignalError {
        SignalError::InvalidAction {
            name: self.config.name.clone(),
            action,
            n_actions: self.config.n_actions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::{ConstantQNetwork, DummySimulator, DummyVehicle, SequenceQNetwork};
    use rand::{rngs::StdRng, SeedableRng};

    fn config() -> IntersectionConfig {
        IntersectionConfig::default()
            .name("single")
            .roads(["E2", "E3", "E4"])
            .traffic_lights(["tl_01", "tl_02", "tl_03"])
    }

    fn memory_config() -> MemoryConfig {
        MemoryConfig::default().capacity(100).min_size(1)
    }

    #[test]
    fn test_reward_weighting() -> Result<()> {
        let mut sim = DummySimulator::new(vec![
            DummyVehicle::new("bus_0", "bus", "E2").waiting_time(10.0),
            DummyVehicle::new("taxi_0", "taxi", "E3").waiting_time(10.0),
            DummyVehicle::new("car_0", "standart_car", "E4").waiting_time(50.0),
        ]);
        let model = ConstantQNetwork::new(vec![1.0, 0.0, 0.0], 8);
        let mut controller = IntersectionController::build(config(), &memory_config(), model)?;
        let total = controller.refresh_waiting(&mut sim)?;
        assert_eq!(total, 30.0);
        assert_eq!(controller.waiting.get("bus_0"), Some(20.0));
        assert_eq!(controller.waiting.get("taxi_0"), Some(10.0));
        assert_eq!(controller.waiting.get("car_0"), None);

        // the bus clears the intersection
        sim.vehicles[0].road = "E8".to_string();
        assert_eq!(controller.refresh_waiting(&mut sim)?, 10.0);
        Ok(())
    }

    #[test]
    fn test_reward_is_previous_minus_current() -> Result<()> {
        let mut sim = DummySimulator::new(vec![
            DummyVehicle::new("bus_0", "bus", "E2").waiting_time(3.0)
        ]);
        let mut rng = StdRng::seed_from_u64(0);
        let timing = PhaseTiming::default();
        let model = ConstantQNetwork::new(vec![1.0, 0.0, 0.0], 8);
        let mut controller = IntersectionController::build(config(), &memory_config(), model)?;

        controller.advance(&mut sim, &timing, 0.0, true, &mut rng)?;
        assert_eq!(controller.memory().len(), 0);
        assert_eq!(controller.neg_reward(), 0.0);

        sim.vehicles[0].waiting_time = 8.0;
        controller.advance(&mut sim, &timing, 0.0, true, &mut rng)?;
        let t = controller.memory().iter().next().cloned().unwrap();
        // 2 * 3 - 2 * 8
        assert_eq!(t.reward, -10.0);
        assert_eq!(t.action, 0);
        assert_eq!(controller.neg_reward(), -10.0);

        sim.vehicles[0].road = "E8".to_string();
        controller.advance(&mut sim, &timing, 0.0, true, &mut rng)?;
        // the first decision is measured against an empty ledger
        assert_eq!(controller.rewards(), &[-6.0, -10.0, 16.0]);
        assert_eq!(controller.neg_reward(), -10.0);
        Ok(())
    }

    #[test]
    fn test_yellow_on_previous_light_then_green() -> Result<()> {
        let mut sim = DummySimulator::default();
        let mut rng = StdRng::seed_from_u64(0);
        let timing = PhaseTiming { green: 10, yellow: 4 };
        let model = SequenceQNetwork::new(vec![2, 0], 3);
        let mut controller = IntersectionController::build(config(), &memory_config(), model)?;

        controller.advance(&mut sim, &timing, 0.0, true, &mut rng)?;
        assert_eq!(controller.phase(), SignalPhase::Green);
        assert_eq!(controller.remaining(), 10);

        controller.elapse(10);
        controller.advance(&mut sim, &timing, 0.0, true, &mut rng)?;
        assert_eq!(controller.phase(), SignalPhase::Yellow { next: 0 });
        assert_eq!(controller.remaining(), 4);

        controller.elapse(4);
        controller.advance(&mut sim, &timing, 0.0, true, &mut rng)?;
        assert_eq!(controller.phase(), SignalPhase::Green);

        let log: Vec<(&str, u32)> = sim
            .phase_log()
            .iter()
            .map(|(_, tls, phase)| (tls.as_str(), *phase))
            .collect();
        assert_eq!(
            log,
            vec![
                ("tl_01", 2),
                ("tl_02", 2),
                ("tl_03", 0),
                ("tl_03", 1),
                ("tl_01", 0),
                ("tl_02", 2),
                ("tl_03", 2),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_replay_targets() -> Result<()> {
        struct Recording {
            targets: Vec<Vec<f32>>,
        }

        impl QNetwork for Recording {
            fn predict_one(&self, _state: &[f32]) -> Result<Vec<f32>> {
                Ok(vec![0.0, 0.0, 0.0])
            }

            fn predict_batch(&self, states: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
                Ok(states.iter().map(|s| vec![s[0], s[0] + 1.0, s[0] + 2.0]).collect())
            }

            fn train_batch(&mut self, _states: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<f32> {
                self.targets = targets.to_vec();
                Ok(0.0)
            }

            fn batch_size(&self) -> usize {
                10
            }

            fn save(&self, _dir: &std::path::Path, _name: &str) -> Result<()> {
                Ok(())
            }

            fn load(&mut self, _dir: &std::path::Path, _name: &str) -> Result<()> {
                Ok(())
            }
        }

        let model = Recording { targets: vec![] };
        let mut controller = IntersectionController::build(config(), &memory_config(), model)?;
        controller
            .memory
            .push(Transition::new(vec![1.0; 30], 1, -4.0, vec![3.0; 30]))?;
        assert!(controller.replay(0.5)?.is_some());
        // Q(s) = [1, 2, 3], max Q(s') = 5
        assert_eq!(controller.model().targets, vec![vec![1.0, -1.5, 3.0]]);
        Ok(())
    }
}
