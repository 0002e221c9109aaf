//! SUMO driven over TraCI.
use crate::{
    traci::{constants::*, TraciClient},
    SumoConfig,
};
use anyhow::{anyhow, bail, Result};
use log::{debug, info, warn};
use signal_core::Simulator;
use std::{
    collections::HashMap,
    net::{Ipv4Addr, TcpListener, TcpStream},
    process::{Child, Command, Stdio},
    time::Duration,
};

/// Returns a port that is free at the time of the call.
fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

/// A SUMO process controlled over TraCI.
///
/// [`Simulator::start`] launches a new process and [`Simulator::close`] terminates it.
pub struct SumoSimulator {
    config: SumoConfig,
    process: Option<Child>,
    client: Option<TraciClient<TcpStream>>,

    // lane speed limits do not change during a run
    lane_max_speeds: HashMap<String, f64>,
}

impl SumoSimulator {
    /// Constructs the simulator. No process is launched until [`Simulator::start`].
    pub fn build(config: SumoConfig) -> Self {
        Self {
            config,
            process: None,
            client: None,
            lane_max_speeds: HashMap::new(),
        }
    }

    /// Configuration of the simulator.
    pub fn config(&self) -> &SumoConfig {
        &self.config
    }

    fn client(&mut self) -> Result<&mut TraciClient<TcpStream>> {
        self.client
            .as_mut()
            .ok_or_else(|| anyhow!("SUMO is not running"))
    }

    fn vehicle_double(&mut self, var: u8, id: &str) -> Result<f64> {
        Ok(self
            .client()?
            .get_double(CMD_GET_VEHICLE_VARIABLE, var, id)?)
    }

    fn vehicle_string(&mut self, var: u8, id: &str) -> Result<String> {
        Ok(self
            .client()?
            .get_string(CMD_GET_VEHICLE_VARIABLE, var, id)?)
    }

    fn kill(&mut self) {
        self.client = None;
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.kill() {
                debug!("SUMO process already terminated: {}", e);
            }
            let _ = process.wait();
        }
    }
}

impl Simulator for SumoSimulator {
    fn start(&mut self) -> Result<()> {
        if self.process.is_some() {
            warn!("SUMO is still running, terminating it");
            self.kill();
        }

        let port = match self.config.port {
            Some(port) => port,
            None => free_port()?,
        };
        let (binary, args) = self.config.command_line(port);
        info!("Launch {} {}", binary, args.join(" "));
        let mut process = Command::new(&binary)
            .args(&args)
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| anyhow!("Failed to launch {}: {}", binary, e))?;

        let client = TraciClient::connect(
            port,
            self.config.retries,
            Duration::from_millis(self.config.retry_wait_ms),
        )
        .and_then(|mut client| client.version().map(|version| (client, version)));
        match client {
            Ok((client, (api, version))) => {
                info!("Connected to {} (TraCI API {})", version, api);
                self.process = Some(process);
                self.client = Some(client);
                self.lane_max_speeds.clear();
                Ok(())
            }
            Err(e) => {
                let _ = process.kill();
                let _ = process.wait();
                Err(e.into())
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut client) = self.client.take() {
            client.close()?;
        }
        if let Some(mut process) = self.process.take() {
            let status = process.wait()?;
            if !status.success() {
                bail!("SUMO exited with {}", status);
            }
        }
        Ok(())
    }

    fn simulation_step(&mut self) -> Result<()> {
        Ok(self.client()?.simulation_step(0.0)?)
    }

    fn vehicle_ids(&mut self) -> Result<Vec<String>> {
        Ok(self
            .client()?
            .get_string_list(CMD_GET_VEHICLE_VARIABLE, ID_LIST, "")?)
    }

    fn vehicle_type(&mut self, id: &str) -> Result<String> {
        self.vehicle_string(VAR_TYPE, id)
    }

    fn vehicle_road(&mut self, id: &str) -> Result<String> {
        self.vehicle_string(VAR_ROAD_ID, id)
    }

    fn vehicle_lane(&mut self, id: &str) -> Result<String> {
        self.vehicle_string(VAR_LANE_ID, id)
    }

    fn vehicle_lane_position(&mut self, id: &str) -> Result<f64> {
        self.vehicle_double(VAR_LANEPOSITION, id)
    }

    fn vehicle_speed(&mut self, id: &str) -> Result<f64> {
        self.vehicle_double(VAR_SPEED, id)
    }

    fn vehicle_accumulated_waiting_time(&mut self, id: &str) -> Result<f64> {
        self.vehicle_double(VAR_ACCUMULATED_WAITING_TIME, id)
    }

    fn vehicle_co2_emission(&mut self, id: &str) -> Result<f64> {
        self.vehicle_double(VAR_CO2EMISSION, id)
    }

    fn vehicle_noise_emission(&mut self, id: &str) -> Result<f64> {
        self.vehicle_double(VAR_NOISEEMISSION, id)
    }

    fn lane_max_speed(&mut self, lane: &str) -> Result<f64> {
        if let Some(v) = self.lane_max_speeds.get(lane) {
            return Ok(*v);
        }
        let v = self
            .client()?
            .get_double(CMD_GET_LANE_VARIABLE, VAR_MAXSPEED, lane)?;
        self.lane_max_speeds.insert(lane.to_string(), v);
        Ok(v)
    }

    fn edge_halting_number(&mut self, edge: &str) -> Result<u32> {
        let n = self.client()?.get_int(
            CMD_GET_EDGE_VARIABLE,
            LAST_STEP_VEHICLE_HALTING_NUMBER,
            edge,
        )?;
        Ok(n.max(0) as u32)
    }

    fn edge_mean_speed(&mut self, edge: &str) -> Result<f64> {
        Ok(self
            .client()?
            .get_double(CMD_GET_EDGE_VARIABLE, LAST_STEP_MEAN_SPEED, edge)?)
    }

    fn set_phase(&mut self, tls: &str, phase: u32) -> Result<()> {
        debug!("Set phase {} of {}", phase, tls);
        Ok(self.client()?.set_phase(tls, phase as i32)?)
    }
}

impl Drop for SumoSimulator {
    fn drop(&mut self) {
        self.kill();
    }
}
