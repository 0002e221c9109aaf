use std::io;
use thiserror::Error;

/// Errors of the TraCI client.
#[derive(Debug, Error)]
pub enum TraciError {
    /// I/O error on the connection.
    #[error("TraCI I/O error: {0}")]
    Io(#[from] io::Error),

    /// The simulator answered with an error status.
    #[error("TraCI command 0x{command:02x} failed with status 0x{result:02x}: {description}")]
    Status {
        /// Command id.
        command: u8,
        /// Result code.
        result: u8,
        /// Description sent by the simulator.
        description: String,
    },

    /// A response did not belong to the command that was sent.
    #[error("Unexpected TraCI response 0x{got:02x}, expected 0x{expected:02x}")]
    UnexpectedResponse {
        /// Expected response id.
        expected: u8,
        /// Received response id.
        got: u8,
    },

    /// A value had an unexpected type tag.
    #[error("Unexpected TraCI type 0x{got:02x}, expected 0x{expected:02x}")]
    UnexpectedType {
        /// Expected type tag.
        expected: u8,
        /// Received type tag.
        got: u8,
    },

    /// The message ended before a value was complete.
    #[error("Truncated TraCI message")]
    Truncated,

    /// The simulator did not accept a connection.
    #[error("Could not connect to TraCI port {port} after {attempts} attempts")]
    Connect {
        /// Port of the simulator.
        port: u16,
        /// The number of attempts.
        attempts: usize,
    },
}
