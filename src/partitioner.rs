//! Maps a record to a partition index.

use rand::Rng;

use crate::record::Record;

/// Assigns a partition for a record that did not request one explicitly.
///
/// The default implementation's hash is not guaranteed to match any other
/// client's partitioner; a caller that needs interoperable partition
/// assignment supplies its own implementation.
pub trait Partitioner: Send + Sync {
    fn partition_for(&self, partition_count: usize, record: &Record) -> i32;
}

/// `record.partition`, if set, else a hash of `partition_key` or `key`, else
/// uniformly random.
#[derive(Debug, Default)]
pub struct DefaultPartitioner;

impl Partitioner for DefaultPartitioner {
    fn partition_for(&self, partition_count: usize, record: &Record) -> i32 {
        if let Some(partition) = record.partition {
            return partition;
        }

        let key = record.partition_key.as_ref().or(record.key.as_ref());
        match key {
            Some(key) => (fnv1a(key) % partition_count as u32) as i32,
            None => rand::thread_rng().gen_range(0..partition_count as i32),
        }
    }
}

/// A stable 32-bit hash, non-negative by construction. Not intended to match
/// any particular broker-side partitioner.
fn fnv1a(data: &[u8]) -> u32 {
    const OFFSET_BASIS: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;

    let mut hash = OFFSET_BASIS;
    for byte in data {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_partition_wins() {
        let record = Record::new("t", None).with_partition(7);
        assert_eq!(DefaultPartitioner.partition_for(3, &record), 7);
    }

    #[test]
    fn hash_is_deterministic() {
        let record = Record::new("t", None).with_key(b"same-key".to_vec());
        let a = DefaultPartitioner.partition_for(16, &record);
        let b = DefaultPartitioner.partition_for(16, &record);
        assert_eq!(a, b);
        assert!((0..16).contains(&a));
    }

    #[test]
    fn partition_key_takes_priority_over_key() {
        let by_key = Record::new("t", None).with_key(b"a".to_vec());
        let by_partition_key = Record::new("t", None)
            .with_key(b"a".to_vec())
            .with_partition_key(b"b".to_vec());

        let p1 = DefaultPartitioner.partition_for(16, &by_key);
        let p2 = DefaultPartitioner.partition_for(16, &by_partition_key);
        // Not a strict inequality requirement (hashes could collide), just
        // confirms partition_key is what gets hashed.
        assert_eq!(
            p2,
            DefaultPartitioner.partition_for(
                16,
                &Record::new("t", None).with_key(b"b".to_vec())
            )
        );
        let _ = p1;
    }
}
