use anyhow::Result;
use clap::Parser;
use signal::{test_experiment, ExperimentConfig, CONFIG_FILE};
use signal_core::{error::SignalError, util::model_dir};
use signal_sumo_env::{RouteGenerator, SumoSimulator};
use std::{path::PathBuf, process};

/// Test trained traffic-signal controllers in SUMO
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of the model directory, as in model_{n}
    #[arg(short, long)]
    model: usize,

    /// Directory holding the numbered model directories
    #[arg(long, default_value = "models")]
    model_base_dir: PathBuf,

    /// Experiment configuration, the copy in the model directory if not given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Launch sumo-gui
    #[arg(long, default_value_t = false)]
    gui: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let dir = match model_dir(&args.model_base_dir, args.model) {
        Some(dir) => dir,
        None => {
            eprintln!(
                "Model number not found: {:?}",
                args.model_base_dir.join(format!("model_{}", args.model))
            );
            process::exit(1);
        }
    };
    let config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::load(dir.join(CONFIG_FILE))?,
    };

    let mut sim = SumoSimulator::build(config.sumo.clone().gui(args.gui));
    let mut generator = RouteGenerator::build(config.routes.clone());
    match test_experiment(&config, &mut sim, &mut generator, &dir) {
        Ok(_) => Ok(()),
        Err(e) => match e.downcast_ref::<SignalError>() {
            Some(SignalError::ModelNotFound(path)) => {
                eprintln!("Model number not found: {:?}", path);
                process::exit(1);
            }
            _ => Err(e),
        },
    }
}
