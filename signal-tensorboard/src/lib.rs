//! Writes episode statistics to TensorBoard event files.
use log::warn;
use signal_core::record::{Record, RecordValue, Recorder};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Write records to TFRecord.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    step_key: String,
}

impl TensorboardRecorder {
    /// Construct a [`TensorboardRecorder`] indexing records by episode.
    ///
    /// TFRecord will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self::with_step_key(logdir, "episode")
    }

    /// Construct a [`TensorboardRecorder`] indexing records by the scalar `step_key`.
    pub fn with_step_key<P: AsRef<Path>>(logdir: P, step_key: impl Into<String>) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            step_key: step_key.into(),
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Write a given [Record] into a TFRecord.
    ///
    /// [RecordValue::Scalar] is written as is, [RecordValue::Array1] as one scalar
    /// `{key}_{i}` (1-based) per element.
    /// Records without the step key are skipped.
    fn write(&mut self, record: Record) {
        let step = match record.get_scalar(&self.step_key) {
            Ok(v) => v as usize,
            Err(e) => {
                warn!("Record skipped: {}", e);
                return;
            }
        };

        for (k, v) in record.iter() {
            if *k == self.step_key {
                continue;
            }
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::Array1(vs) => {
                    for (i, v) in vs.iter().enumerate() {
                        self.writer
                            .add_scalar(&format!("{}_{}", k, i + 1), *v, step);
                    }
                }
            }
        }
    }

    fn flush(&mut self) {
        self.writer.flush();
    }
}
