//! Simulator.
use anyhow::Result;

/// Control surface of a microscopic traffic simulator.
///
/// The controller treats the simulator as an opaque stepper: it advances the
/// simulation one discrete step at a time, queries vehicles and edges, and sets the
/// active phase of named traffic lights. Queries take `&mut self` since a remote
/// simulator answers them over a single connection.
///
/// Vehicle, lane and edge identifiers are the simulator's own string ids.
pub trait Simulator {
    /// Starts a simulation run. Called once at the beginning of every episode,
    /// after the route file has been written.
    fn start(&mut self) -> Result<()>;

    /// Terminates the running simulation.
    fn close(&mut self) -> Result<()>;

    /// Advances the simulation by one step.
    fn simulation_step(&mut self) -> Result<()>;

    /// Identifiers of the vehicles currently in the network.
    fn vehicle_ids(&mut self) -> Result<Vec<String>>;

    /// Vehicle type id, e.g. `"bus"`.
    fn vehicle_type(&mut self, id: &str) -> Result<String>;

    /// Edge on which the vehicle is located.
    fn vehicle_road(&mut self, id: &str) -> Result<String>;

    /// Lane on which the vehicle is located.
    fn vehicle_lane(&mut self, id: &str) -> Result<String>;

    /// Position of the vehicle along its lane, measured from the lane start.
    fn vehicle_lane_position(&mut self, id: &str) -> Result<f64>;

    /// Current speed in m/s.
    fn vehicle_speed(&mut self, id: &str) -> Result<f64>;

    /// Waiting time accumulated by the vehicle.
    fn vehicle_accumulated_waiting_time(&mut self, id: &str) -> Result<f64>;

    /// CO2 emission of the last step in mg/s.
    fn vehicle_co2_emission(&mut self, id: &str) -> Result<f64>;

    /// Noise emission of the last step in dB.
    fn vehicle_noise_emission(&mut self, id: &str) -> Result<f64>;

    /// Maximum allowed speed on the lane.
    fn lane_max_speed(&mut self, lane: &str) -> Result<f64>;

    /// Number of halting vehicles on the edge in the last step.
    fn edge_halting_number(&mut self, edge: &str) -> Result<u32>;

    /// Mean speed of the vehicles on the edge in the last step.
    fn edge_mean_speed(&mut self, edge: &str) -> Result<f64>;

    /// Sets the phase index of the traffic light.
    fn set_phase(&mut self, tls: &str, phase: u32) -> Result<()>;
}
