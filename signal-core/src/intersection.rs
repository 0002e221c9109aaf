//! Signalised intersections.
//!
//! An intersection has a list of incoming roads and one traffic light per approach.
//! The action of its controller is the index of the approach that gets green.
mod config;
mod controller;
mod ledger;
mod state;
mod vehicle;
pub use config::IntersectionConfig;
pub use controller::{IntersectionController, PhaseTiming, SignalPhase};
pub use ledger::VehicleLedger;
pub use state::StateEncoder;
pub use vehicle::VehicleClass;
