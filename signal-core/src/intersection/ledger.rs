//! Per-vehicle ledgers.
use std::collections::{HashMap, HashSet};

/// Latest value of some quantity per vehicle, e.g., weighted accumulated waiting time.
///
/// A vehicle enters the ledger while it is on a monitored road and leaves it as
/// soon as it is seen elsewhere or disappears from the simulation.
#[derive(Debug, Default, Clone)]
pub struct VehicleLedger {
    entries: HashMap<String, f64>,
}

impl VehicleLedger {
    /// Constructs an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` for a vehicle on a monitored road.
    pub fn insert(&mut self, id: &str, value: f64) {
        match self.entries.get_mut(id) {
            Some(v) => *v = value,
            None => {
                self.entries.insert(id.to_string(), value);
            }
        }
    }

    /// Drops a vehicle that left the monitored roads.
    pub fn remove(&mut self, id: &str) {
        self.entries.remove(id);
    }

    /// Drops every vehicle not in `present`.
    pub fn retain_present(&mut self, present: &HashSet<&str>) {
        self.entries.retain(|id, _| present.contains(id.as_str()));
    }

    /// Value recorded for a vehicle.
    pub fn get(&self, id: &str) -> Option<f64> {
        self.entries.get(id).copied()
    }

    /// Sum over all vehicles.
    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    /// Number of vehicles in the ledger.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no vehicle is in the ledger.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every vehicle.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
