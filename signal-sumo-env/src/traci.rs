//! Client side of the TraCI protocol.
//!
//! Messages are big-endian. A message starts with its total length as a 4-byte
//! integer, followed by commands. A command is `[length: u8][id: u8][content]`, or
//! `[0][length: i32][id: u8][content]` if it does not fit into a byte.
//! Every response starts with a status command per request command.
mod client;
pub mod constants;
mod error;
mod message;
pub use client::TraciClient;
pub use error::TraciError;
pub use message::{Reader, Value, Writer};
