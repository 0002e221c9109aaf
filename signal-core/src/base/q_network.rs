//! Action-value function.
use anyhow::Result;
use std::path::Path;

/// Action-value function of a single intersection.
///
/// The network maps an encoded state to one Q-value per action. It is trained
/// on pairs of states and target Q-vectors built by the replay step of
/// [`IntersectionController`](crate::IntersectionController).
pub trait QNetwork {
    /// Q-values for a single state. The length of the output equals the number of actions.
    fn predict_one(&self, state: &[f32]) -> Result<Vec<f32>>;

    /// Q-values for a batch of states, one row per state.
    fn predict_batch(&self, states: &[Vec<f32>]) -> Result<Vec<Vec<f32>>>;

    /// Performs one gradient step on the batch with mean-squared-error loss and
    /// returns the loss.
    fn train_batch(&mut self, states: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<f32>;

    /// Number of samples drawn from the memory for a replay pass.
    fn batch_size(&self) -> usize;

    /// Saves parameters as `name` in directory `dir`.
    fn save(&self, dir: &Path, name: &str) -> Result<()>;

    /// Loads parameters saved with [`QNetwork::save`].
    ///
    /// Fails with [`SignalError::ModelNotFound`](crate::error::SignalError::ModelNotFound)
    /// if the file does not exist.
    fn load(&mut self, dir: &Path, name: &str) -> Result<()>;
}
