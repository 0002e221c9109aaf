//! The [SUMO](https://eclipse.dev/sumo/) traffic simulator as a
//! [`Simulator`](signal_core::Simulator), and a route-file
//! [`TrafficGenerator`](signal_core::TrafficGenerator).
//!
//! ## Simulator
//!
//! [`SumoSimulator`] launches a SUMO process for every episode and controls it through
//! the TraCI protocol on a TCP connection. The protocol is implemented in [`traci`]:
//! only the commands needed by the intersection controllers are supported, i.e.,
//! stepping the simulation, reading vehicle, lane and edge variables and setting
//! traffic-light phases.
//!
//! ## Traffic demand
//!
//! [`RouteGenerator`] writes the route file referenced by the SUMO configuration. Depart
//! times follow a Weibull distribution over the episode and every vehicle gets a class
//! and a route of the [`Topology`] of the experiment.
mod config;
pub mod route_gen;
mod simulator;
pub mod traci;
pub use config::SumoConfig;
pub use route_gen::{RouteGenerator, RouteGeneratorConfig, Topology};
pub use simulator::SumoSimulator;
