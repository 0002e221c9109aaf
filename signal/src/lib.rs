//! Adaptive traffic-signal control with deep Q-learning over SUMO.
//!
//! The workspace consists of the following crates:
//!
//! * `signal-core` provides the traits of simulators, Q-networks and traffic generators,
//!   the intersection controller, the experience memory, the episode runner, the trainer
//!   and the evaluator.
//! * `signal-candle-agent` implements the Q-network on
//!   [candle](https://crates.io/crates/candle-core).
//! * `signal-sumo-env` drives [SUMO](https://eclipse.dev/sumo/) over TraCI and writes
//!   route files.
//! * `signal-tensorboard` writes episode statistics to TensorBoard event files.
//! * `signal`, this crate, puts them together into experiments with one
//!   ([`Variant::Single`]) or two ([`Variant::Dual`]) intersections, and provides the
//!   `signal-train` and `signal-test` binaries.
//!
//! # Training
//!
//! ```bash
//! signal-train --variant dual --dump dual.yaml
//! signal-train --config dual.yaml
//! ```
//!
//! Every run creates a directory `model_{n}` below the model base directory holding
//! the trained models, the experiment configuration, `history.csv` and TensorBoard
//! event files.
//!
//! # Testing
//!
//! ```bash
//! signal-test --model 3
//! ```
//!
//! runs a greedy episode with the models of `model_3` and writes the results below
//! `model_3/test`.
mod config;
mod experiment;
mod preset;
pub use config::{ControllerConfig, ExperimentConfig, CONFIG_FILE};
pub use experiment::{test_experiment, train_experiment};
pub use preset::Variant;

/// Q-network of the experiments.
pub type Model = signal_candle_agent::DqnModel<signal_candle_agent::mlp::Mlp>;
