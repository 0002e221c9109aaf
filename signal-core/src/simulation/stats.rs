//! Statistics of episodes.
use crate::{
    intersection::{VehicleClass, VehicleLedger},
    record::{Record, RecordValue},
    Simulator,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

/// Per-step statistics accumulated over the monitored roads of all intersections.
pub(crate) struct StepStats {
    roads: Vec<String>,
    waiting: VehicleLedger,
    waiting_public: VehicleLedger,
    co2: VehicleLedger,
    noise: VehicleLedger,
    pub(crate) queue_per_step: Vec<u32>,
    pub(crate) wait_sum: f64,
    pub(crate) public_wait_sum: f64,
    pub(crate) co2_sum: f64,
    pub(crate) noise_sum: f64,
    pub(crate) speed_sum: f64,
}

impl StepStats {
    pub(crate) fn new(roads: Vec<String>) -> Self {
        Self {
            roads,
            waiting: VehicleLedger::new(),
            waiting_public: VehicleLedger::new(),
            co2: VehicleLedger::new(),
            noise: VehicleLedger::new(),
            queue_per_step: vec![],
            wait_sum: 0.0,
            public_wait_sum: 0.0,
            co2_sum: 0.0,
            noise_sum: 0.0,
            speed_sum: 0.0,
        }
    }

    /// Reads the simulator after a simulated step.
    pub(crate) fn observe<S: Simulator>(&mut self, sim: &mut S) -> Result<()> {
        let mut queue = 0;
        let mut speed = 0.0;
        for road in self.roads.iter() {
            queue += sim.edge_halting_number(road)?;
            speed += sim.edge_mean_speed(road)?;
        }
        self.queue_per_step.push(queue);
        self.speed_sum += speed;

        let ids = sim.vehicle_ids()?;
        for id in ids.iter() {
            let road = sim.vehicle_road(id)?;
            if self.roads.contains(&road) {
                let wait = sim.vehicle_accumulated_waiting_time(id)?;
                self.waiting.insert(id, wait);
                if VehicleClass::from_type_id(&sim.vehicle_type(id)?).is_public() {
                    self.waiting_public.insert(id, wait);
                }
                self.co2.insert(id, sim.vehicle_co2_emission(id)?);
                self.noise.insert(id, sim.vehicle_noise_emission(id)?);
            } else {
                self.waiting.remove(id);
                self.waiting_public.remove(id);
                self.co2.remove(id);
                self.noise.remove(id);
            }
        }
        let present: HashSet<&str> = ids.iter().map(String::as_str).collect();
        for ledger in [
            &mut self.waiting,
            &mut self.waiting_public,
            &mut self.co2,
            &mut self.noise,
        ] {
            ledger.retain_present(&present);
        }

        self.wait_sum += self.waiting.total();
        self.public_wait_sum += self.waiting_public.total();
        self.co2_sum += self.co2.total();
        self.noise_sum += self.noise.total();
        Ok(())
    }

    pub(crate) fn queue_sum(&self) -> u64 {
        self.queue_per_step.iter().map(|q| *q as u64).sum()
    }
}

/// Result of an episode run by [`Simulation`](super::Simulation).
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    /// Sum of the negative rewards, one per intersection.
    pub neg_rewards: Vec<f64>,

    /// Rewards per decision, one series per intersection.
    pub rewards: Vec<Vec<f32>>,

    /// Sum over steps of the accumulated waiting time of all vehicles on monitored roads.
    pub cumulative_wait: f64,

    /// Sum over steps of the accumulated waiting time of buses and taxis on monitored
    /// roads, unweighted.
    pub cumulative_wait_bus_taxi: f64,

    /// Halting vehicles on monitored roads, one value per step.
    pub queue_per_step: Vec<u32>,

    /// Sum of the halting numbers divided by the step budget.
    pub avg_queue_length: f64,

    /// Sum over steps of the CO2 emission of vehicles on monitored roads.
    pub co2: f64,

    /// Sum of the edge mean speeds divided by the step budget.
    pub mean_speed: f64,

    /// Sum over steps of the noise emission of vehicles on monitored roads.
    pub noise: f64,
}

/// A row of the training history.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EpisodeStats {
    /// Episode index, starting at 0.
    pub episode: usize,

    /// Epsilon used in the episode.
    pub epsilon: f64,

    /// Sum of the negative rewards, one per intersection.
    pub neg_rewards: Vec<f64>,

    /// See [`EpisodeSummary::cumulative_wait`].
    pub cumulative_wait: f64,

    /// See [`EpisodeSummary::cumulative_wait_bus_taxi`].
    pub cumulative_wait_bus_taxi: f64,

    /// See [`EpisodeSummary::avg_queue_length`].
    pub avg_queue_length: f64,

    /// See [`EpisodeSummary::co2`].
    pub co2: f64,

    /// See [`EpisodeSummary::mean_speed`].
    pub mean_speed: f64,

    /// See [`EpisodeSummary::noise`].
    pub noise: f64,

    /// Wall-clock seconds spent in the simulation.
    pub simulation_secs: f64,

    /// Wall-clock seconds spent in replay, one per intersection.
    pub training_secs: Vec<f64>,
}

impl EpisodeStats {
    /// Builds the row of an episode.
    pub fn new(episode: usize, epsilon: f64, summary: &EpisodeSummary) -> Self {
        Self {
            episode,
            epsilon,
            neg_rewards: summary.neg_rewards.clone(),
            cumulative_wait: summary.cumulative_wait,
            cumulative_wait_bus_taxi: summary.cumulative_wait_bus_taxi,
            avg_queue_length: summary.avg_queue_length,
            co2: summary.co2,
            mean_speed: summary.mean_speed,
            noise: summary.noise,
            simulation_secs: 0.0,
            training_secs: vec![],
        }
    }

    /// Converts the row into a [`Record`] keyed by `"episode"`.
    ///
    /// Per-intersection series are [`RecordValue::Array1`] under `neg_reward` and
    /// `training_secs`.
    pub fn to_record(&self) -> Record {
        let to_f32 = |vs: &[f64]| -> Vec<f32> { vs.iter().map(|v| *v as f32).collect() };
        let mut record = Record::from_scalar("episode", self.episode as f32);
        record.insert("epsilon", RecordValue::Scalar(self.epsilon as f32));
        record.insert("neg_reward", RecordValue::Array1(to_f32(&self.neg_rewards)));
        record.insert(
            "training_secs",
            RecordValue::Array1(to_f32(&self.training_secs)),
        );
        for (k, v) in [
            ("cumulative_wait", self.cumulative_wait),
            ("cumulative_wait_bus_taxi", self.cumulative_wait_bus_taxi),
            ("avg_queue_length", self.avg_queue_length),
            ("co2", self.co2),
            ("mean_speed", self.mean_speed),
            ("noise", self.noise),
            ("simulation_secs", self.simulation_secs),
        ] {
            record.insert(k, RecordValue::Scalar(v as f32));
        }
        record
    }

    fn header(n_intersections: usize) -> Vec<String> {
        let mut header = vec!["episode".to_string(), "epsilon".to_string()];
        header.extend((1..=n_intersections).map(|i| format!("neg_reward_{}", i)));
        header.extend(
            [
                "cumulative_wait",
                "cumulative_wait_bus_taxi",
                "avg_queue_length",
                "co2",
                "mean_speed",
                "noise",
                "simulation_secs",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        header.extend((1..=n_intersections).map(|i| format!("training_secs_{}", i)));
        header
    }

    fn row(&self) -> Vec<String> {
        let mut row = vec![self.episode.to_string(), self.epsilon.to_string()];
        row.extend(self.neg_rewards.iter().map(|v| v.to_string()));
        row.extend(
            [
                self.cumulative_wait,
                self.cumulative_wait_bus_taxi,
                self.avg_queue_length,
                self.co2,
                self.mean_speed,
                self.noise,
                self.simulation_secs,
            ]
            .iter()
            .map(|v| v.to_string()),
        );
        row.extend(self.training_secs.iter().map(|v| v.to_string()));
        row
    }

    /// Writes the history as CSV with one column per intersection for the
    /// per-intersection series.
    pub fn write_csv(history: &[EpisodeStats], path: impl AsRef<Path>) -> Result<()> {
        let n_intersections = history.first().map_or(0, |s| s.neg_rewards.len());
        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(Self::header(n_intersections))?;
        for stats in history.iter() {
            wtr.write_record(stats.row())?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn stats(episode: usize) -> EpisodeStats {
        EpisodeStats {
            episode,
            epsilon: 0.5,
            neg_rewards: vec![-10.0, -20.0],
            cumulative_wait: 100.0,
            cumulative_wait_bus_taxi: 40.0,
            avg_queue_length: 1.5,
            co2: 3.0,
            mean_speed: 7.0,
            noise: 60.0,
            simulation_secs: 1.0,
            training_secs: vec![0.5, 0.25],
        }
    }

    #[test]
    fn test_write_csv() -> Result<()> {
        let dir = TempDir::new("history")?;
        let path = dir.path().join("history.csv");
        EpisodeStats::write_csv(&[stats(0), stats(1)], &path)?;

        let mut rdr = csv::Reader::from_path(&path)?;
        let headers = rdr.headers()?.clone();
        assert_eq!(headers.len(), 13);
        assert_eq!(&headers[2], "neg_reward_1");
        assert_eq!(&headers[5], "cumulative_wait_bus_taxi");
        assert_eq!(&headers[12], "training_secs_2");
        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][0], "1");
        Ok(())
    }

    #[test]
    fn test_to_record() {
        let record = stats(3).to_record();
        assert_eq!(record.get_scalar("episode").unwrap(), 3.0);
        assert_eq!(record.get_array1("neg_reward").unwrap(), vec![-10.0, -20.0]);
        assert_eq!(record.get_array1("training_secs").unwrap(), vec![0.5, 0.25]);
        assert_eq!(record.get_scalar("cumulative_wait_bus_taxi").unwrap(), 40.0);
    }
}
