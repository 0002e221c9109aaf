//! Training and test runs of an experiment.
use crate::{ExperimentConfig, CONFIG_FILE};
use anyhow::Result;
use log::info;
use signal_core::{
    record::Recorder, EpisodeStats, EvaluationResult, Evaluator, Simulator, TrafficGenerator,
    Trainer,
};
use std::path::Path;

/// Trains fresh controllers and stores the results in `model_dir`.
///
/// The directory receives the models (`trained_model_{i}`), a copy of the configuration
/// and the training history as `history.csv`.
pub fn train_experiment<S, G>(
    config: &ExperimentConfig,
    sim: &mut S,
    generator: &mut G,
    model_dir: &Path,
    recorder: &mut dyn Recorder,
) -> Result<Vec<EpisodeStats>>
where
    S: Simulator,
    G: TrafficGenerator,
{
    config.validate()?;
    let mut controllers = config.build_controllers()?;
    let mut trainer = Trainer::build(config.trainer.clone());
    let history = trainer.train(sim, generator, &mut controllers, recorder)?;

    Trainer::save_models(model_dir, &controllers)?;
    config.save(model_dir.join(CONFIG_FILE))?;
    EpisodeStats::write_csv(&history, model_dir.join("history.csv"))?;
    info!("Training results saved in {:?}", model_dir);
    Ok(history)
}

/// Runs a greedy episode with the models in `model_dir` and writes the results into
/// `{model_dir}/test`.
pub fn test_experiment<S, G>(
    config: &ExperimentConfig,
    sim: &mut S,
    generator: &mut G,
    model_dir: &Path,
) -> Result<EvaluationResult>
where
    S: Simulator,
    G: TrafficGenerator,
{
    config.validate()?;
    let mut controllers = config.build_controllers()?;
    Trainer::load_models(model_dir, &mut controllers)?;

    let mut evaluator = Evaluator::new(
        config.trainer.max_steps,
        config.trainer.timing,
        config.test_seed,
    )?;
    let result = evaluator.evaluate(sim, generator, &mut controllers)?;
    result.write_csv(model_dir.join("test"))?;
    info!("Test results saved in {:?}", model_dir.join("test"));
    Ok(result)
}
