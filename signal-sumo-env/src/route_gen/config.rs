use super::Topology;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Configuration of [`RouteGenerator`](super::RouteGenerator).
pub struct RouteGeneratorConfig {
    /// Step budget of an episode, the latest depart time.
    pub max_steps: u32,

    /// The number of vehicles of an episode.
    pub n_vehicles: usize,

    /// Route file, overwritten for every episode.
    pub route_file: PathBuf,

    /// Road network.
    pub topology: Topology,
}

impl Default for RouteGeneratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 5400,
            n_vehicles: 1000,
            route_file: PathBuf::from("intersection/episode_routes.rou.xml"),
            topology: Topology::Single,
        }
    }
}

impl RouteGeneratorConfig {
    /// Sets the step budget.
    pub fn max_steps(mut self, v: u32) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the number of vehicles.
    pub fn n_vehicles(mut self, v: usize) -> Self {
        self.n_vehicles = v;
        self
    }

    /// Sets the route file.
    pub fn route_file(mut self, v: impl Into<PathBuf>) -> Self {
        self.route_file = v.into();
        self
    }

    /// Sets the road network.
    pub fn topology(mut self, v: Topology) -> Self {
        self.topology = v;
        self
    }

    /// Constructs [`RouteGeneratorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RouteGeneratorConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
