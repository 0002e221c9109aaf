#![warn(missing_docs)]
//! Core components for reinforcement-learning traffic-signal control.
//!
//! Every signalised intersection is driven by an [`IntersectionController`] that owns
//! a [`QNetwork`] and an experience [`Memory`](replay_buffer::Memory). The
//! [`Simulation`] runs all controllers of a network in lock step against a
//! [`Simulator`], and the [`Trainer`] repeats episodes with fresh traffic from a
//! [`TrafficGenerator`], replaying memories after each of them.
pub mod dummy;
pub mod error;
pub mod intersection;
pub mod record;
pub mod replay_buffer;
pub mod util;

mod base;
pub use base::{ExperienceBufferBase, QNetwork, ReplayBufferBase, Simulator, TrafficGenerator};

mod explorer;
pub use explorer::{argmax, EpsilonGreedy};

pub use intersection::{IntersectionConfig, IntersectionController, PhaseTiming};

mod simulation;
pub use simulation::{EpisodeStats, EpisodeSummary, Simulation};

mod trainer;
pub use trainer::{model_name, Trainer, TrainerConfig};

mod evaluator;
pub use evaluator::{EvaluationResult, Evaluator};
