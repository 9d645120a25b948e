//! The producer's two staging areas: an unassigned [`PendingQueue`] and a
//! per-partition [`MessageBuffer`] awaiting delivery.

use std::collections::BTreeMap;

use crate::record::Record;

/// A FIFO of records that have not yet been assigned a partition.
#[derive(Debug, Default)]
pub struct PendingQueue {
    records: Vec<Record>,
}

impl PendingQueue {
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn byte_size(&self) -> usize {
        self.records.iter().map(Record::byte_size).sum()
    }

    /// Atomically substitutes the queue's contents, returning whatever was
    /// there before — used by the partition-assignment pass to drain the
    /// queue and put back only the records that could not be assigned.
    pub fn replace(&mut self, records: Vec<Record>) -> Vec<Record> {
        std::mem::replace(&mut self.records, records)
    }
}

/// `topic -> partition -> ordered records`.
///
/// Insertion order within a `(topic, partition)` list is the only ordering
/// guarantee this crate makes; callers relying on cross-partition ordering
/// within a topic get it only to the extent the partition-assignment pass
/// preserves it (see [`crate::producer`]).
#[derive(Debug, Default)]
pub struct MessageBuffer {
    topics: BTreeMap<String, BTreeMap<i32, Vec<Record>>>,
}

impl MessageBuffer {
    pub fn push(&mut self, partition: i32, record: Record) {
        self.topics
            .entry(record.topic.clone())
            .or_default()
            .entry(partition)
            .or_default()
            .push(record);
    }

    pub fn len(&self) -> usize {
        self.topics
            .values()
            .flat_map(|partitions| partitions.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_size(&self) -> usize {
        self.topics
            .values()
            .flat_map(|partitions| partitions.values())
            .flat_map(|records| records.iter())
            .map(Record::byte_size)
            .sum()
    }

    /// Iterates `(topic, partition, records)` triples without draining them.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32, &[Record])> {
        self.topics.iter().flat_map(|(topic, partitions)| {
            partitions
                .iter()
                .map(move |(&partition, records)| (topic.as_str(), partition, records.as_slice()))
        })
    }

    /// Removes and returns the records buffered for one partition, e.g.
    /// after a successful produce response for that partition.
    pub fn take(&mut self, topic: &str, partition: i32) -> Vec<Record> {
        let Some(partitions) = self.topics.get_mut(topic) else {
            return Vec::new();
        };
        let taken = partitions.remove(&partition).unwrap_or_default();
        if partitions.is_empty() {
            self.topics.remove(topic);
        }
        taken
    }

    /// Drains the whole buffer, e.g. to reconstruct the undelivered list for
    /// a `DELIVERY_FAILED` error.
    pub fn drain_all(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.topics)
            .into_values()
            .flat_map(|partitions| partitions.into_values())
            .flatten()
            .collect()
    }

    pub fn clear(&mut self) {
        self.topics.clear();
    }
}
