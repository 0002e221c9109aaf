//! This module is used for tests.
//!
//! [`DummySimulator`] is a scriptable in-memory [`Simulator`]. [`ConstantQNetwork`]
//! and [`SequenceQNetwork`] are [`QNetwork`]s with fixed outputs that count calls.
use crate::{error::SignalError, QNetwork, Simulator, TrafficGenerator};
use anyhow::{anyhow, Result};
use std::{cell::Cell, collections::HashMap, fs, path::Path};

/// A vehicle of [`DummySimulator`].
#[derive(Clone, Debug)]
pub struct DummyVehicle {
    /// Vehicle id.
    pub id: String,
    /// Vehicle type id.
    pub type_id: String,
    /// Edge id.
    pub road: String,
    /// Lane id.
    pub lane: String,
    /// Position along the lane.
    pub lane_position: f64,
    /// Speed.
    pub speed: f64,
    /// Accumulated waiting time.
    pub waiting_time: f64,
    /// CO2 emission.
    pub co2: f64,
    /// Noise emission.
    pub noise: f64,
}

impl DummyVehicle {
    /// A vehicle standing at the start of lane `{road}_0`.
    pub fn new(id: impl Into<String>, type_id: impl Into<String>, road: impl Into<String>) -> Self {
        let road = road.into();
        Self {
            id: id.into(),
            type_id: type_id.into(),
            lane: format!("{}_0", road),
            road,
            lane_position: 0.0,
            speed: 0.0,
            waiting_time: 0.0,
            co2: 0.0,
            noise: 0.0,
        }
    }

    /// Sets the lane position.
    pub fn lane_position(mut self, v: f64) -> Self {
        self.lane_position = v;
        self
    }

    /// Sets the speed.
    pub fn speed(mut self, v: f64) -> Self {
        self.speed = v;
        self
    }

    /// Sets the accumulated waiting time.
    pub fn waiting_time(mut self, v: f64) -> Self {
        self.waiting_time = v;
        self
    }

    /// Sets the emissions.
    pub fn emissions(mut self, co2: f64, noise: f64) -> Self {
        self.co2 = co2;
        self.noise = noise;
        self
    }
}

type StepHook = Box<dyn FnMut(u32, &mut Vec<DummyVehicle>)>;

/// A scriptable simulator.
///
/// Every call to [`Simulator::set_phase`] is logged with the current step.
/// An optional hook mutates the vehicles after each simulated step.
pub struct DummySimulator {
    /// Vehicles in the network.
    pub vehicles: Vec<DummyVehicle>,
    /// Maximum speed of every lane.
    pub lane_max_speed: f64,
    /// Halting number per edge. Missing edges report 0.
    pub halting: HashMap<String, u32>,
    /// Mean speed per edge. Missing edges report 0.
    pub mean_speed: HashMap<String, f64>,
    step: u32,
    n_starts: usize,
    n_closes: usize,
    phase_log: Vec<(u32, String, u32)>,
    on_step: Option<StepHook>,
}

impl Default for DummySimulator {
    fn default() -> Self {
        Self {
            vehicles: vec![],
            lane_max_speed: 13.9,
            halting: HashMap::new(),
            mean_speed: HashMap::new(),
            step: 0,
            n_starts: 0,
            n_closes: 0,
            phase_log: vec![],
            on_step: None,
        }
    }
}

impl DummySimulator {
    /// Constructs a simulator with the given vehicles.
    pub fn new(vehicles: Vec<DummyVehicle>) -> Self {
        Self {
            vehicles,
            ..Self::default()
        }
    }

    /// Sets a hook called after every simulated step with the new step count.
    pub fn on_step(mut self, f: impl FnMut(u32, &mut Vec<DummyVehicle>) + 'static) -> Self {
        self.on_step = Some(Box::new(f));
        self
    }

    /// Steps simulated since the last start.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Number of started runs.
    pub fn n_starts(&self) -> usize {
        self.n_starts
    }

    /// Number of closed runs.
    pub fn n_closes(&self) -> usize {
        self.n_closes
    }

    /// `(step, traffic light, phase)` of every phase change.
    pub fn phase_log(&self) -> &[(u32, String, u32)] {
        &self.phase_log
    }

    fn vehicle(&self, id: &str) -> Result<&DummyVehicle> {
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| anyhow!("Unknown vehicle {}", id))
    }
}

impl Simulator for DummySimulator {
    fn start(&mut self) -> Result<()> {
        self.step = 0;
        self.n_starts += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.n_closes += 1;
        Ok(())
    }

    fn simulation_step(&mut self) -> Result<()> {
        self.step += 1;
        if let Some(f) = self.on_step.as_mut() {
            f(self.step, &mut self.vehicles);
        }
        Ok(())
    }

    fn vehicle_ids(&mut self) -> Result<Vec<String>> {
        Ok(self.vehicles.iter().map(|v| v.id.clone()).collect())
    }

    fn vehicle_type(&mut self, id: &str) -> Result<String> {
        Ok(self.vehicle(id)?.type_id.clone())
    }

    fn vehicle_road(&mut self, id: &str) -> Result<String> {
        Ok(self.vehicle(id)?.road.clone())
    }

    fn vehicle_lane(&mut self, id: &str) -> Result<String> {
        Ok(self.vehicle(id)?.lane.clone())
    }

    fn vehicle_lane_position(&mut self, id: &str) -> Result<f64> {
        Ok(self.vehicle(id)?.lane_position)
    }

    fn vehicle_speed(&mut self, id: &str) -> Result<f64> {
        Ok(self.vehicle(id)?.speed)
    }

    fn vehicle_accumulated_waiting_time(&mut self, id: &str) -> Result<f64> {
        Ok(self.vehicle(id)?.waiting_time)
    }

    fn vehicle_co2_emission(&mut self, id: &str) -> Result<f64> {
        Ok(self.vehicle(id)?.co2)
    }

    fn vehicle_noise_emission(&mut self, id: &str) -> Result<f64> {
        Ok(self.vehicle(id)?.noise)
    }

    fn lane_max_speed(&mut self, _lane: &str) -> Result<f64> {
        Ok(self.lane_max_speed)
    }

    fn edge_halting_number(&mut self, edge: &str) -> Result<u32> {
        Ok(self.halting.get(edge).copied().unwrap_or(0))
    }

    fn edge_mean_speed(&mut self, edge: &str) -> Result<f64> {
        Ok(self.mean_speed.get(edge).copied().unwrap_or(0.0))
    }

    fn set_phase(&mut self, tls: &str, phase: u32) -> Result<()> {
        self.phase_log.push((self.step, tls.to_string(), phase));
        Ok(())
    }
}

/// A [`QNetwork`] returning the same Q-values for every state.
pub struct ConstantQNetwork {
    values: Vec<f32>,
    batch_size: usize,
    n_train_calls: usize,
}

impl ConstantQNetwork {
    /// Constructs the network.
    pub fn new(values: Vec<f32>, batch_size: usize) -> Self {
        Self {
            values,
            batch_size,
            n_train_calls: 0,
        }
    }

    /// Number of calls of [`QNetwork::train_batch`].
    pub fn n_train_calls(&self) -> usize {
        self.n_train_calls
    }
}

impl QNetwork for ConstantQNetwork {
    fn predict_one(&self, _state: &[f32]) -> Result<Vec<f32>> {
        Ok(self.values.clone())
    }

    fn predict_batch(&self, states: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        Ok(states.iter().map(|_| self.values.clone()).collect())
    }

    fn train_batch(&mut self, _states: &[Vec<f32>], _targets: &[Vec<f32>]) -> Result<f32> {
        self.n_train_calls += 1;
        Ok(0.0)
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn save(&self, dir: &Path, name: &str) -> Result<()> {
        let path = dir.join(format!("{}.yaml", name));
        fs::write(path, serde_yaml::to_string(&self.values)?)?;
        Ok(())
    }

    fn load(&mut self, dir: &Path, name: &str) -> Result<()> {
        let path = dir.join(format!("{}.yaml", name));
        if !path.is_file() {
            return Err(SignalError::ModelNotFound(path).into());
        }
        self.values = serde_yaml::from_str(&fs::read_to_string(path)?)?;
        Ok(())
    }
}

/// A [`QNetwork`] preferring the actions of a fixed sequence, one per call of
/// [`QNetwork::predict_one`], cycling at the end.
pub struct SequenceQNetwork {
    actions: Vec<usize>,
    n_actions: usize,
    cursor: Cell<usize>,
}

impl SequenceQNetwork {
    /// Constructs the network.
    pub fn new(actions: Vec<usize>, n_actions: usize) -> Self {
        Self {
            actions,
            n_actions,
            cursor: Cell::new(0),
        }
    }

    fn one_hot(&self, action: usize) -> Vec<f32> {
        (0..self.n_actions)
            .map(|i| if i == action { 1.0 } else { 0.0 })
            .collect()
    }
}

impl QNetwork for SequenceQNetwork {
    fn predict_one(&self, _state: &[f32]) -> Result<Vec<f32>> {
        let i = self.cursor.get();
        self.cursor.set(i + 1);
        Ok(self.one_hot(self.actions[i % self.actions.len()]))
    }

    fn predict_batch(&self, states: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        Ok(states.iter().map(|_| self.one_hot(0)).collect())
    }

    fn train_batch(&mut self, _states: &[Vec<f32>], _targets: &[Vec<f32>]) -> Result<f32> {
        Ok(0.0)
    }

    fn batch_size(&self) -> usize {
        1
    }

    fn save(&self, _dir: &Path, _name: &str) -> Result<()> {
        Ok(())
    }

    fn load(&mut self, _dir: &Path, _name: &str) -> Result<()> {
        Ok(())
    }
}

/// A [`TrafficGenerator`] remembering the seeds it was called with.
#[derive(Default)]
pub struct DummyGenerator {
    /// Seeds in call order.
    pub seeds: Vec<u64>,
}

impl TrafficGenerator for DummyGenerator {
    fn generate(&mut self, seed: u64) -> Result<()> {
        self.seeds.push(seed);
        Ok(())
    }
}
