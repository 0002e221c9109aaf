//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the controller, the trainer and the records.
#[derive(Error, Debug)]
pub enum SignalError {
    /// A trained model was expected at the given path but does not exist.
    #[error("Model number not found: {0}")]
    ModelNotFound(PathBuf),

    /// The action is not a valid index for the intersection.
    #[error("Action {action} is out of range for intersection {name} with {n_actions} actions")]
    InvalidAction {
        /// Name of the intersection.
        name: String,
        /// The offending action.
        action: usize,
        /// Number of actions of the intersection.
        n_actions: usize,
    },

    /// A state or Q-value vector does not have the expected length.
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    Dimension {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
