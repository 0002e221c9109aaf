//! Configuration of [`SumoSimulator`](super::SumoSimulator).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Configuration of [`SumoSimulator`](super::SumoSimulator).
pub struct SumoConfig {
    /// Command-line binary of SUMO.
    pub binary: String,

    /// Launch `sumo-gui` instead of [`SumoConfig::binary`].
    pub gui: bool,

    /// SUMO configuration file (`.sumocfg`).
    pub sumocfg: PathBuf,

    /// TraCI port. A free port is picked for every run if not given.
    pub port: Option<u16>,

    /// Step budget of an episode, also used as the waiting-time memory of SUMO.
    pub max_steps: u32,

    /// The number of connection attempts after launch.
    pub retries: usize,

    /// Milliseconds between connection attempts.
    pub retry_wait_ms: u64,

    /// Additional command-line arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for SumoConfig {
    fn default() -> Self {
        Self {
            binary: "sumo".to_string(),
            gui: false,
            sumocfg: PathBuf::from("intersection/sumo_config.sumocfg"),
            port: None,
            max_steps: 5400,
            retries: 50,
            retry_wait_ms: 100,
            extra_args: vec![],
        }
    }
}

impl SumoConfig {
    /// Sets the SUMO binary.
    pub fn binary(mut self, v: impl Into<String>) -> Self {
        self.binary = v.into();
        self
    }

    /// Set `true` to launch the GUI.
    pub fn gui(mut self, v: bool) -> Self {
        self.gui = v;
        self
    }

    /// Sets the SUMO configuration file.
    pub fn sumocfg(mut self, v: impl Into<PathBuf>) -> Self {
        self.sumocfg = v.into();
        self
    }

    /// Sets the TraCI port.
    pub fn port(mut self, v: Option<u16>) -> Self {
        self.port = v;
        self
    }

    /// Sets the step budget of an episode.
    pub fn max_steps(mut self, v: u32) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the number of connection attempts.
    pub fn retries(mut self, v: usize) -> Self {
        self.retries = v;
        self
    }

    /// Command line of a run on `port`.
    pub fn command_line(&self, port: u16) -> (String, Vec<String>) {
        let binary = if self.gui {
            "sumo-gui".to_string()
        } else {
            self.binary.clone()
        };
        let mut args = vec![
            "-c".to_string(),
            self.sumocfg.to_string_lossy().into_owned(),
            "--no-step-log".to_string(),
            "true".to_string(),
            "--waiting-time-memory".to_string(),
            self.max_steps.to_string(),
            "--remote-port".to_string(),
            port.to_string(),
        ];
        args.extend(self.extra_args.iter().cloned());
        (binary, args)
    }

    /// Constructs [`SumoConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SumoConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
