//! Base implementation of records for logging.
use crate::error::SignalError;
use std::collections::{hash_map::Iter, HashMap};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone)]
pub enum RecordValue {
    /// A single floating-point value, typically used for metrics like queue length.
    Scalar(f32),

    /// A 1-dimensional array of floating-point values, one value per intersection.
    Array1(Vec<f32>),
}

/// Key-value pairs describing an episode.
///
/// # Examples
///
/// ```rust
/// use signal_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("cumulative_wait", 1520.0);
/// record.insert("neg_reward", RecordValue::Array1(vec![-120.0, -80.5]));
///
/// assert_eq!(record.get_scalar("cumulative_wait").unwrap(), 1520.0);
/// assert_eq!(record.get_array1("neg_reward").unwrap()[1], -80.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Inserts a key-value pair, replacing the value of an existing key.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a scalar value from the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the key does not exist or the value is not a scalar.
    pub fn get_scalar(&self, k: &str) -> Result<f32, SignalError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(SignalError::RecordValueTypeError("Scalar".to_string())),
            None => Err(SignalError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, SignalError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(SignalError::RecordValueTypeError("Array1".to_string())),
            None => Err(SignalError::RecordKeyError(k.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_with_wrong_type_or_key() {
        let mut record = Record::from_scalar("co2", 12.0);
        record.insert("neg_reward", RecordValue::Array1(vec![-3.0, -4.0]));
        assert!(matches!(
            record.get_scalar("neg_reward"),
            Err(SignalError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            record.get_array1("co2"),
            Err(SignalError::RecordValueTypeError(_))
        ));
        assert!(matches!(
            record.get_scalar("noise"),
            Err(SignalError::RecordKeyError(_))
        ));
        assert_eq!(record.get_array1("neg_reward").unwrap(), vec![-3.0, -4.0]);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut record = Record::from_scalar("episode", 1.0);
        record.insert("episode", RecordValue::Scalar(2.0));
        assert_eq!(record.get_scalar("episode").unwrap(), 2.0);
        assert_eq!(record.iter().count(), 1);
    }
}
