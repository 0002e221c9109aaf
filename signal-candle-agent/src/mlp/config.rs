use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) activation_out: bool,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `units` - Widths of the hidden layers, at least one.
    /// * `activation_out` - If `true`, activation function is added in the final layer.
    pub fn new(in_dim: usize, units: Vec<usize>, out_dim: usize, activation_out: bool) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation_out,
        }
    }

    /// A first layer of `width` units followed by `num_layers` further layers of the
    /// same width, with a linear output.
    pub fn uniform(in_dim: usize, num_layers: usize, width: usize, out_dim: usize) -> Self {
        Self::new(in_dim, vec![width; num_layers + 1], out_dim, false)
    }

    /// Input dimension.
    pub fn in_dim(&self) -> usize {
        self.in_dim
    }

    /// Output dimension.
    pub fn out_dim(&self) -> usize {
        self.out_dim
    }

    /// Pairs of input and output dimensions of the linear layers.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let mut dims = Vec::with_capacity(self.units.len() + 1);
        let mut prev = self.in_dim;
        for &u in self.units.iter() {
            dims.push((prev, u));
            prev = u;
        }
        dims.push((prev, self.out_dim));
        dims
    }
}

/// One line per layer, then the number of parameters.
impl fmt::Display for MlpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims = self.layer_dims();
        let n_layers = dims.len();
        let mut n_params = 0;
        for (i, (in_dim, out_dim)) in dims.into_iter().enumerate() {
            let act = if i + 1 < n_layers || self.activation_out {
                "relu"
            } else {
                "linear"
            };
            writeln!(f, "ln{}: Linear({} -> {}), {}", i, in_dim, out_dim, act)?;
            n_params += (in_dim + 1) * out_dim;
        }
        write!(f, "Total params: {}", n_params)
    }
}
