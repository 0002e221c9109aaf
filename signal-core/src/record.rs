//! Types and traits for recording training and evaluation metrics.
//!
//! A [`Record`] is a set of key-value pairs produced at the end of an episode.
//! The [`Trainer`](crate::Trainer) hands it to a [`Recorder`], which writes it to
//! some destination, e.g., TensorBoard event files.
//!
//! # Basic Usage
//!
//! ```rust
//! use signal_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("episode", 3.0);
//! record.insert("avg_queue_length", RecordValue::Scalar(4.25));
//! record.insert("neg_reward", RecordValue::Array1(vec![-120.0, -80.5]));
//! assert_eq!(record.get_scalar("episode").unwrap(), 3.0);
//! ```
//!
//! # Components
//!
//! * [`Record`] - A container of key-value pairs
//! * [`RecordValue`] - Values stored in a record
//! * [`Recorder`] - Destination of records
//! * [`BufferedRecorder`] - Keeps records in memory
//! * [`NullRecorder`] - Discards records
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
