use anyhow::Result;
use clap::Parser;
use log::info;
use signal::{train_experiment, ExperimentConfig, Variant};
use signal_core::util::next_model_dir;
use signal_sumo_env::{RouteGenerator, SumoSimulator};
use signal_tensorboard::TensorboardRecorder;
use std::path::PathBuf;

/// Train traffic-signal controllers in SUMO
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Experiment configuration in YAML, the preset of --variant if not given
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Preset experiment
    #[arg(short, long, value_enum, default_value_t = Variant::Single)]
    variant: Variant,

    /// Write the configuration to the given file and exit
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Number of training episodes
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Directory holding the numbered model directories
    #[arg(short, long)]
    model_base_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::preset(args.variant),
    };
    if let Some(n) = args.episodes {
        config = config.total_episodes(n);
    }
    if let Some(dir) = &args.model_base_dir {
        config = config.model_base_dir(dir);
    }

    if let Some(path) = &args.dump {
        config.save(path)?;
        info!("Configuration written to {:?}", path);
        return Ok(());
    }

    let model_dir = next_model_dir(&config.model_base_dir)?;
    let mut sim = SumoSimulator::build(config.sumo.clone());
    let mut generator = RouteGenerator::build(config.routes.clone());
    let mut recorder = TensorboardRecorder::new(&model_dir);
    train_experiment(&config, &mut sim, &mut generator, &model_dir, &mut recorder)?;
    Ok(())
}
