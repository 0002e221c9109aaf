//! State encoding.
use super::{IntersectionConfig, VehicleClass};
use crate::Simulator;
use anyhow::Result;

/// Encodes the traffic around an intersection into a state vector.
///
/// Cell `road * n_buckets + bucket` of the occupancy block holds 2 if a bus and 1 if
/// a taxi is in that distance bucket of that road, the last vehicle read winning.
/// The optional speed block holds the running mean of `min(speed / lane max speed, 1)`
/// over the tracked vehicles of each cell.
///
/// Private cars, vehicles on roads the intersection does not monitor and vehicles
/// farther than `lane_length` from the stop line are not encoded.
pub struct StateEncoder {
    roads: Vec<String>,
    lane_length: f64,
    bucket_bounds: Vec<f64>,
    speed_block: bool,
}

impl StateEncoder {
    /// Constructs the encoder of an intersection.
    pub fn new(config: &IntersectionConfig) -> Self {
        Self {
            roads: config.roads.clone(),
            lane_length: config.lane_length,
            bucket_bounds: config.bucket_bounds.clone(),
            speed_block: config.speed_block,
        }
    }

    fn n_buckets(&self) -> usize {
        self.bucket_bounds.len() + 1
    }

    fn n_cells(&self) -> usize {
        self.roads.len() * self.n_buckets()
    }

    /// Length of the state vector.
    pub fn dim(&self) -> usize {
        if self.speed_block {
            2 * self.n_cells()
        } else {
            self.n_cells()
        }
    }

    /// Index of the distance bucket, `None` beyond the lane length.
    ///
    /// Negative distances come from vehicles past the nominal end of the lane and
    /// fall into bucket 0.
    pub fn bucket(&self, distance: f64) -> Option<usize> {
        if distance > self.lane_length || distance.is_nan() {
            return None;
        }
        Some(
            self.bucket_bounds
                .iter()
                .position(|b| distance < *b)
                .unwrap_or(self.bucket_bounds.len()),
        )
    }

    /// Index of the road in the state, `None` for unmonitored roads.
    pub fn road_index(&self, road: &str) -> Option<usize> {
        self.roads.iter().position(|r| r == road)
    }

    /// Cell of the occupancy block for a vehicle on `road` at `lane_position`.
    pub fn cell(&self, road: &str, lane_position: f64) -> Option<usize> {
        let road = self.road_index(road)?;
        let bucket = self.bucket(self.lane_length - lane_position)?;
        Some(road * self.n_buckets() + bucket)
    }

    /// Reads the vehicles from the simulator and builds the state vector.
    pub fn encode<S: Simulator>(&self, sim: &mut S) -> Result<Vec<f32>> {
        let n_cells = self.n_cells();
        let mut state = vec![0f32; self.dim()];
        let mut counts = vec![0u32; n_cells];

        for id in sim.vehicle_ids()? {
            let class = VehicleClass::from_type_id(&sim.vehicle_type(&id)?);
            let value = match class.occupancy() {
                Some(value) => value,
                None => continue,
            };
            let road = sim.vehicle_road(&id)?;
            if self.road_index(&road).is_none() {
                continue;
            }
            let cell = match self.cell(&road, sim.vehicle_lane_position(&id)?) {
                Some(cell) => cell,
                None => continue,
            };
            state[cell] = value;

            if self.speed_block {
                let lane = sim.vehicle_lane(&id)?;
                let max_speed = sim.lane_max_speed(&lane)?;
                let speed = sim.vehicle_speed(&id)?;
                let v = if max_speed > 0.0 {
                    (speed / max_speed).min(1.0) as f32
                } else {
                    0.0
                };
                let n = counts[cell] as f32;
                let mean = &mut state[n_cells + cell];
                *mean = (*mean * n + v) / (n + 1.0);
                counts[cell] += 1;
            }
        }

        Ok(state)
    }
}
