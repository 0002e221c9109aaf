//! Traffic generator.
use anyhow::Result;

/// Produces the traffic demand of an episode.
///
/// Implementations write the input of the simulator, typically a route file,
/// and must do so before [`Simulator::start`](crate::Simulator::start) is called.
/// The same seed must produce the same demand.
pub trait TrafficGenerator {
    /// Generates the demand for the episode seeded with `seed`.
    fn generate(&mut self, seed: u64) -> Result<()>;
}
