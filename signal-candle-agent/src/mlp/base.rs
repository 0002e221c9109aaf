use super::MlpConfig;
use crate::model::SubModel1;
use anyhow::{bail, Result};
use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Returns vector of linear modules from [`MlpConfig`].
fn create_linear_layers(prefix: &str, vs: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    if config.units.is_empty() {
        bail!("MLP needs at least one hidden layer");
    }
    let vs = vs.pp(prefix);

    let mut layers = vec![];
    for (i, (in_dim, out_dim)) in config.layer_dims().into_iter().enumerate() {
        layers.push(linear(in_dim, out_dim, vs.pp(format!("ln{}", i)))?);
    }
    Ok(layers)
}

/// Multilayer perceptron with ReLU activation function.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        let mut xs = xs.to_device(&self.device)?;
        let n_layers = self.layers.len();

        for layer in self.layers[..n_layers - 1].iter() {
            xs = layer.forward(&xs)?.relu()?;
        }
        let xs = self.layers[n_layers - 1].forward(&xs)?;

        if self.config.activation_out {
            Ok(xs.relu()?)
        } else {
            Ok(xs)
        }
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vs.device().clone();
        let layers = create_linear_layers("mlp", vs, &config)?;

        Ok(Self {
            config,
            device,
            layers,
        })
    }
}
