use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    Device,
};
use anyhow::{bail, Result};
use candle_core::{DType, Tensor};
use candle_nn::{loss::mse, VarBuilder, VarMap};
use log::{debug, info};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use signal_core::{error::SignalError, QNetwork};
use std::{
    fmt::Display,
    fs::{self, File},
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`DqnModel`].
pub struct DqnModelConfig<Q> {
    /// Configuration of the action-value function.
    pub q_config: Q,

    /// Configuration of the optimizer.
    #[serde(default)]
    pub opt_config: OptimizerConfig,

    /// The number of samples drawn from the memory for a replay pass.
    pub batch_size: usize,

    /// Device on which the model is placed.
    #[serde(default)]
    pub device: Device,
}

impl<Q> DqnModelConfig<Q>
where
    Q: DeserializeOwned + Serialize,
{
    /// Constructs the configuration with the default optimizer, a batch size of 100
    /// and the CPU device.
    pub fn new(q_config: Q) -> Self {
        Self {
            q_config,
            opt_config: OptimizerConfig::default(),
            batch_size: 100,
            device: Device::Cpu,
        }
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`DqnModelConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnModelConfig`] to as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value function trained with mean squared error.
///
/// The parameters live in a [`VarMap`] and are persisted as safetensors.
pub struct DqnModel<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone + Display,
{
    device: candle_core::Device,
    varmap: VarMap,
    config: DqnModelConfig<Q::Config>,

    // Action-value function
    q: Q,
    opt: Optimizer,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone + Display,
{
    /// Constructs [`DqnModel`] with freshly initialized parameters.
    pub fn build(config: DqnModelConfig<Q::Config>) -> Result<Self> {
        let device: candle_core::Device = config.device.try_into()?;
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, config.q_config.clone())?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            device,
            varmap,
            config,
            q,
            opt,
        })
    }

    /// Configuration of the model.
    pub fn config(&self) -> &DqnModelConfig<Q::Config> {
        &self.config
    }

    /// Outputs the action-values of a batch of states.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        self.q.forward(xs)
    }

    fn to_tensor(&self, rows: &[Vec<f32>]) -> Result<Tensor> {
        let dim = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows.iter() {
            if row.len() != dim {
                return Err(SignalError::Dimension {
                    expected: dim,
                    got: row.len(),
                }
                .into());
            }
            data.extend_from_slice(row);
        }
        Ok(Tensor::from_vec(data, (rows.len(), dim), &self.device)?)
    }
}

impl<Q> QNetwork for DqnModel<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone + Display,
{
    fn predict_one(&self, state: &[f32]) -> Result<Vec<f32>> {
        let xs = Tensor::from_slice(state, (1, state.len()), &self.device)?;
        let mut q = self.forward(&xs)?.to_vec2::<f32>()?;
        Ok(q.pop().unwrap_or_default())
    }

    fn predict_batch(&self, states: &[Vec<f32>]) -> Result<Vec<Vec<f32>>> {
        if states.is_empty() {
            return Ok(vec![]);
        }
        let xs = self.to_tensor(states)?;
        Ok(self.forward(&xs)?.to_vec2::<f32>()?)
    }

    fn train_batch(&mut self, states: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<f32> {
        if states.len() != targets.len() {
            bail!(
                "{} states but {} targets in a training batch",
                states.len(),
                targets.len()
            );
        }
        if states.is_empty() {
            return Ok(0.0);
        }

        let xs = self.to_tensor(states)?;
        let tgt = self.to_tensor(targets)?;
        let pred = self.forward(&xs)?;
        let loss = mse(&pred, &tgt)?;
        self.opt.backward_step(&loss)?;

        let loss = loss.to_scalar::<f32>()?;
        debug!("Trained on {} samples, loss {}", states.len(), loss);
        Ok(loss)
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    fn save(&self, dir: &Path, name: &str) -> Result<()> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.safetensors", name));
        self.varmap.save(&path)?;
        fs::write(
            dir.join(format!("{}_structure.txt", name)),
            format!("{}\n", self.config.q_config),
        )?;
        self.config.save(dir.join(format!("{}_config.yaml", name)))?;
        info!("Save dqnmodel to {:?}", path);
        Ok(())
    }

    fn load(&mut self, dir: &Path, name: &str) -> Result<()> {
        let path = dir.join(format!("{}.safetensors", name));
        if !path.is_file() {
            return Err(SignalError::ModelNotFound(path).into());
        }
        self.varmap.load(&path)?;
        info!("Load dqnmodel from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mlp::{Mlp, MlpConfig};
    use tempdir::TempDir;

    fn config() -> DqnModelConfig<MlpConfig> {
        DqnModelConfig::new(MlpConfig::uniform(6, 1, 16, 3))
            .opt_config(OptimizerConfig::Adam { lr: 0.01 })
            .batch_size(4)
    }

    fn states() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0, 0.0, 2.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 2.0],
            vec![2.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        ]
    }

    #[test]
    fn test_predict_dims() -> Result<()> {
        let model = DqnModel::<Mlp>::build(config())?;
        assert_eq!(model.predict_one(&states()[0])?.len(), 3);

        let q = model.predict_batch(&states())?;
        assert_eq!(q.len(), 4);
        assert!(q.iter().all(|row| row.len() == 3));
        assert_eq!(model.batch_size(), 4);
        Ok(())
    }

    #[test]
    fn test_training_reduces_loss() -> Result<()> {
        let mut model = DqnModel::<Mlp>::build(config())?;
        let targets = vec![
            vec![1.0, -1.0, 0.5],
            vec![-0.5, 2.0, 0.0],
            vec![0.0, 0.0, -1.0],
            vec![1.5, 0.5, 0.5],
        ];
        let first = model.train_batch(&states(), &targets)?;
        let mut last = first;
        for _ in 0..200 {
            last = model.train_batch(&states(), &targets)?;
        }
        assert!(last < first * 0.1, "loss {} -> {}", first, last);
        Ok(())
    }

    #[test]
    fn test_mismatched_batch() -> Result<()> {
        let mut model = DqnModel::<Mlp>::build(config())?;
        assert!(model.train_batch(&states(), &states()[..2]).is_err());
        assert!(model.predict_batch(&[vec![0.0; 6], vec![0.0; 5]]).is_err());
        Ok(())
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let tmp = TempDir::new("dqn_model")?;
        let model = DqnModel::<Mlp>::build(config())?;
        model.save(tmp.path(), "trained_model_1")?;
        assert!(tmp.path().join("trained_model_1.safetensors").is_file());
        assert!(tmp.path().join("trained_model_1_structure.txt").is_file());
        let config_ = DqnModelConfig::<MlpConfig>::load(tmp.path().join("trained_model_1_config.yaml"))?;
        assert_eq!(config_, config());

        let mut model_ = DqnModel::<Mlp>::build(config())?;
        model_.load(tmp.path(), "trained_model_1")?;
        assert_eq!(model.predict_batch(&states())?, model_.predict_batch(&states())?);

        let err = model_.load(tmp.path(), "trained_model_2").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SignalError>(),
            Some(SignalError::ModelNotFound(_))
        ));
        Ok(())
    }
}
