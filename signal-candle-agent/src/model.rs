//! Interface of neural networks used in the Q-network.
use anyhow::Result;
use candle_nn::VarBuilder;

/// Neural network model not owing its [`VarMap`] internally.
///
/// [`VarMap`]: https://docs.rs/candle-nn/0.8.4/candle_nn/var_map/struct.VarMap.html
pub trait SubModel1: Sized {
    /// Configuration from which [`SubModel1`] is constructed.
    type Config;

    /// Input of the [`SubModel1`].
    type Input;

    /// Output of the [`SubModel1`].
    type Output;

    /// Builds [`SubModel1`] with [`VarBuilder`] and [`SubModel1::Config`].
    ///
    /// [`VarBuilder`]: https://docs.rs/candle-nn/0.8.4/candle_nn/var_builder/type.VarBuilder.html
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>;

    /// A generalized forward function.
    fn forward(&self, input: &Self::Input) -> Result<Self::Output>;
}
