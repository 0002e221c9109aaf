use super::{RouteGeneratorConfig, VehicleType};
use anyhow::Result;
use log::info;
use rand::{distributions::WeightedIndex, prelude::Distribution, rngs::StdRng, Rng, SeedableRng};
use rand_distr::Weibull;
use signal_core::TrafficGenerator;
use std::{fmt::Write as _, fs};

/// A vehicle of the route file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedVehicle {
    /// Vehicle id, `{class}_{route}_{index}`.
    pub id: String,

    /// Index into [`Topology::vehicle_types`](super::Topology::vehicle_types).
    pub vtype: usize,

    /// Route id.
    pub route: &'static str,

    /// Depart step.
    pub depart: u32,
}

/// Writes the route file of an episode.
pub struct RouteGenerator {
    config: RouteGeneratorConfig,
}

impl RouteGenerator {
    /// Constructs the generator.
    pub fn build(config: RouteGeneratorConfig) -> Self {
        Self { config }
    }

    /// Configuration of the generator.
    pub fn config(&self) -> &RouteGeneratorConfig {
        &self.config
    }

    /// Depart steps of `n_vehicles` vehicles in ascending order.
    ///
    /// Weibull samples of shape 2 are sorted and mapped affinely so that the second
    /// smallest lands on step 0 and the largest on `max_steps`. The result is rounded
    /// half to even, and the smallest sample, which falls before 0, is clamped to 0.
    pub fn depart_steps(&self, rng: &mut impl Rng) -> Result<Vec<u32>> {
        let n = self.config.n_vehicles;
        let weibull = Weibull::new(1.0, 2.0)?;
        let mut samples: Vec<f64> = weibull.sample_iter(&mut *rng).take(n).collect();
        samples.sort_by(|a, b| a.total_cmp(b));

        if n < 2 {
            return Ok(vec![0; n]);
        }
        let (min_old, max_old) = (samples[1], samples[n - 1]);
        let span = max_old - min_old;
        if span <= f64::EPSILON {
            return Ok(vec![0; n]);
        }

        let max_new = self.config.max_steps as f64;
        Ok(samples
            .iter()
            .map(|v| {
                let step = (max_new / span) * (v - max_old) + max_new;
                step.round_ties_even().clamp(0.0, max_new) as u32
            })
            .collect())
    }

    /// Draws the vehicles of the episode with `seed`.
    pub fn plan(&self, seed: u64) -> Result<Vec<PlannedVehicle>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let departs = self.depart_steps(&mut rng)?;

        let origins = self.config.topology.origins();
        let origin_dist = WeightedIndex::new(origins.iter().map(|o| o.weight))?;
        let prefixes = self.config.topology.vehicle_types().map(|t| t.prefix);

        let vehicles = departs
            .into_iter()
            .enumerate()
            .map(|(i, depart)| {
                let vtype = if rng.gen::<f64>() < 0.75 {
                    0
                } else if rng.gen::<f64>() < 0.75 {
                    1
                } else {
                    2
                };
                let origin = &origins[origin_dist.sample(&mut rng)];
                let route = origin.routes[rng.gen_range(0..origin.routes.len())];
                PlannedVehicle {
                    id: format!("{}_{}_{}", prefixes[vtype], route, i),
                    vtype,
                    route,
                    depart,
                }
            })
            .collect();
        Ok(vehicles)
    }

    /// Renders the route file.
    pub fn to_xml(&self, vehicles: &[PlannedVehicle]) -> Result<String> {
        let types = self.config.topology.vehicle_types();
        let mut xml = String::from("<routes>\n");
        for t in types.iter() {
            let VehicleType {
                id,
                vclass,
                length,
                max_speed,
                color,
                ..
            } = t;
            writeln!(
                xml,
                r#"    <vType accel="1.0" decel="4.5" vClass="{}" id="{}" length="{:.1}" minGap="2.5" maxSpeed="{}" sigma="0.5" color="{}" />"#,
                vclass, id, length, max_speed, color
            )?;
        }
        xml.push('\n');
        for (id, edges) in self.config.topology.routes() {
            writeln!(xml, r#"    <route id="{}" edges="{}"/>"#, id, edges)?;
        }
        xml.push('\n');
        for v in vehicles.iter() {
            let t = &types[v.vtype];
            writeln!(
                xml,
                r#"    <vehicle id="{}" type="{}" route="{}" depart="{}" departLane="random" departSpeed="{}" />"#,
                v.id, t.id, v.route, v.depart, t.depart_speed
            )?;
        }
        xml.push_str("</routes>\n");
        Ok(xml)
    }
}

impl TrafficGenerator for RouteGenerator {
    fn generate(&mut self, seed: u64) -> Result<()> {
        let vehicles = self.plan(seed)?;
        let xml = self.to_xml(&vehicles)?;
        if let Some(dir) = self.config.route_file.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.config.route_file, xml)?;
        info!(
            "Wrote {} vehicles to {:?} with seed {}",
            vehicles.len(),
            self.config.route_file,
            seed
        );
        Ok(())
    }
}
