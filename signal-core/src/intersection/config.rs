//! Configuration of an intersection.
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of an intersection.
///
/// The state of the intersection has one cell per `(road, distance bucket)` pair.
/// `bucket_bounds` are the exclusive upper bounds of all buckets but the last one,
/// whose upper bound is `lane_length` (inclusive). With nine bounds there are ten
/// buckets per road.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IntersectionConfig {
    /// Name used in logs and records.
    pub name: String,

    /// Incoming roads (edge ids). The position in the list is the road index of the state.
    pub roads: Vec<String>,

    /// Traffic lights, one per action.
    pub traffic_lights: Vec<String>,

    /// Length of the monitored part of each incoming road in meters.
    pub lane_length: f64,

    /// Upper bounds of the distance buckets.
    pub bucket_bounds: Vec<f64>,

    /// If `true`, the state has a second block with the mean normalised speed per cell.
    pub speed_block: bool,

    /// Phase index of a green light.
    #[serde(default = "default_green_phase")]
    pub green_phase: u32,

    /// Phase index of a yellow light.
    #[serde(default = "default_yellow_phase")]
    pub yellow_phase: u32,

    /// Phase index of a red light.
    #[serde(default = "default_red_phase")]
    pub red_phase: u32,
}

fn default_green_phase() -> u32 {
    0
}

fn default_yellow_phase() -> u32 {
    1
}

fn default_red_phase() -> u32 {
    2
}

impl Default for IntersectionConfig {
    fn default() -> Self {
        Self {
            name: "".to_string(),
            roads: vec![],
            traffic_lights: vec![],
            lane_length: 300.0,
            bucket_bounds: vec![5.0, 10.0, 15.0, 20.0, 30.0, 50.0, 100.0, 150.0, 200.0],
            speed_block: false,
            green_phase: default_green_phase(),
            yellow_phase: default_yellow_phase(),
            red_phase: default_red_phase(),
        }
    }
}

impl IntersectionConfig {
    /// Sets the name.
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.name = v.into();
        self
    }

    /// Sets the incoming roads.
    pub fn roads<T: Into<String>>(mut self, v: impl IntoIterator<Item = T>) -> Self {
        self.roads = v.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the traffic lights, one per action.
    pub fn traffic_lights<T: Into<String>>(mut self, v: impl IntoIterator<Item = T>) -> Self {
        self.traffic_lights = v.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the monitored lane length.
    pub fn lane_length(mut self, v: f64) -> Self {
        self.lane_length = v;
        self
    }

    /// Sets the upper bounds of the distance buckets.
    pub fn bucket_bounds(mut self, v: Vec<f64>) -> Self {
        self.bucket_bounds = v;
        self
    }

    /// Enables or disables the speed block of the state.
    pub fn speed_block(mut self, v: bool) -> Self {
        self.speed_block = v;
        self
    }

    /// Number of actions.
    pub fn n_actions(&self) -> usize {
        self.traffic_lights.len()
    }

    /// Number of distance buckets per road.
    pub fn n_buckets(&self) -> usize {
        self.bucket_bounds.len() + 1
    }

    /// Number of cells of the occupancy block.
    pub fn n_cells(&self) -> usize {
        self.roads.len() * self.n_buckets()
    }

    /// Length of the state vector.
    pub fn state_dim(&self) -> usize {
        if self.speed_block {
            2 * self.n_cells()
        } else {
            self.n_cells()
        }
    }

    /// Checks the consistency of the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.roads.is_empty() {
            bail!("Intersection {} has no incoming roads", self.name);
        }
        if self.traffic_lights.is_empty() {
            bail!("Intersection {} has no traffic lights", self.name);
        }
        let increasing = self.bucket_bounds.windows(2).all(|w| w[0] < w[1]);
        let below_length = self
            .bucket_bounds
            .last()
            .map_or(true, |b| *b < self.lane_length);
        if !increasing || !below_length {
            bail!(
                "Bucket bounds of intersection {} must increase and stay below {}",
                self.name,
                self.lane_length
            );
        }
        Ok(())
    }

    /// Constructs [`IntersectionConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`IntersectionConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_dimensions() {
        let config = IntersectionConfig::default()
            .roads(["E4", "E5", "E6", "E7"])
            .traffic_lights(["tl_04", "tl_05", "tl_06", "tl_07"])
            .speed_block(true);
        assert_eq!(config.n_actions(), 4);
        assert_eq!(config.n_cells(), 40);
        assert_eq!(config.state_dim(), 80);
    }

    #[test]
    fn test_validate_rejects_bounds_beyond_lane() {
        let config = IntersectionConfig::default()
            .roads(["E2"])
            .traffic_lights(["tl_01"])
            .lane_length(100.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_intersection_config() -> Result<()> {
        let config = IntersectionConfig::default()
            .name("single")
            .roads(["E2", "E3", "E4"])
            .traffic_lights(["tl_01", "tl_02", "tl_03"]);
        let dir = TempDir::new("intersection_config")?;
        let path = dir.path().join("intersection.yaml");
        config.save(&path)?;
        assert_eq!(IntersectionConfig::load(&path)?, config);
        Ok(())
    }
}
