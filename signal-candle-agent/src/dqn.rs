//! Deep Q-network of an intersection controller.
mod model;
pub use model::{DqnModel, DqnModelConfig};
