//! The user-visible unit produced and delivered by this crate.

use chrono::{DateTime, Utc};

/// A single record to be (or that has been) published to a topic.
///
/// Immutable once constructed; [`crate::producer::Producer::produce`] takes
/// one by value and either enqueues it or rejects it whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub value: Option<Vec<u8>>,
    pub key: Option<Vec<u8>>,
    pub topic: String,
    /// Explicit partition assignment. When set, the
    /// [`Partitioner`](crate::partitioner::Partitioner) is bypassed.
    pub partition: Option<i32>,
    /// Hashed by the default partitioner in preference to `key`. Never sent
    /// over the wire.
    pub partition_key: Option<Vec<u8>>,
    pub create_time: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new(topic: impl Into<String>, value: impl Into<Option<Vec<u8>>>) -> Self {
        Self {
            value: value.into(),
            key: None,
            topic: topic.into(),
            partition: None,
            partition_key: None,
            create_time: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_partition(mut self, partition: i32) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn with_partition_key(mut self, partition_key: impl Into<Vec<u8>>) -> Self {
        self.partition_key = Some(partition_key.into());
        self
    }

    pub fn with_create_time(mut self, create_time: DateTime<Utc>) -> Self {
        self.create_time = Some(create_time);
        self
    }

    /// `len(key) + len(value)`, the quantity the producer's buffer limits
    /// are measured in.
    pub fn byte_size(&self) -> usize {
        self.key.as_ref().map_or(0, Vec::len) + self.value.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_size_counts_key_and_value() {
        let record = Record::new("topic", Some(b"value".to_vec())).with_key(b"key".to_vec());
        assert_eq!(record.byte_size(), 3 + 5);
    }

    #[test]
    fn byte_size_of_empty_record_is_zero() {
        let record = Record::new("topic", None);
        assert_eq!(record.byte_size(), 0);
    }
}
