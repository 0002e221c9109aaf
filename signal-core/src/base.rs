//! Core functionalities.
mod generator;
mod q_network;
mod replay_buffer;
mod simulator;
pub use generator::TrafficGenerator;
pub use q_network::QNetwork;
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use simulator::Simulator;
