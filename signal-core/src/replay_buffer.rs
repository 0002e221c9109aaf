//! Experience memory of an intersection controller.
//!
//! [`Memory`] is a first-in-first-out buffer of [`Transition`]s with a fixed capacity.
//! Sampling is gated by a minimum fill size: until the memory holds that many
//! transitions, [`ReplayBufferBase::batch`](crate::ReplayBufferBase::batch) returns an
//! empty batch and no training happens.
mod base;
mod config;
mod transition;
pub use base::Memory;
pub use config::MemoryConfig;
pub use transition::Transition;
