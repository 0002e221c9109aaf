//! Q-network for traffic-signal control implemented with
//! [candle](https://crates.io/crates/candle-core).
pub mod dqn;
pub mod mlp;
pub mod model;
pub mod opt;
pub use dqn::{DqnModel, DqnModelConfig};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Default)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    #[default]
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl TryFrom<Device> for candle_core::Device {
    type Error = candle_core::Error;

    fn try_from(device: Device) -> Result<Self, Self::Error> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => candle_core::Device::new_cuda(n),
        }
    }
}
