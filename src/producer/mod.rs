//! The public producer facade: enqueue, deliver-with-retries, buffer-limit
//! enforcement, shutdown.

mod operation;

use std::collections::HashSet;
use std::time::Duration;

use tracing::warn;

use crate::backoff::Backoff;
use crate::buffer::{MessageBuffer, PendingQueue};
use crate::cluster::Cluster;
use crate::compression::Codec;
use crate::error::{Error, ProducerError};
use crate::partitioner::{DefaultPartitioner, Partitioner};
use crate::record::Record;
use crate::record_batch::MAGIC_V1;

#[derive(Debug, Clone)]
pub struct ProducerConfig {
    /// `0` = fire and forget, `1` = leader only, `-1` = all in-sync replicas.
    pub required_acks: i16,
    /// Sent to the broker as a hint; not enforced client-side.
    pub ack_timeout: Duration,
    pub max_retries: usize,
    pub retry_backoff: Duration,
    pub max_buffer_size: usize,
    pub max_buffer_byte_size: usize,
    pub compression_codec: Codec,
    pub compression_threshold: usize,
    /// Magic byte this producer encodes with. `1` (the default) includes a
    /// per-record timestamp; `0` targets legacy (pre-KIP-32) brokers.
    pub magic: i8,
}

impl ProducerConfig {
    pub fn new() -> Self {
        Self {
            required_acks: 1,
            ack_timeout: Duration::from_millis(1500),
            max_retries: 3,
            retry_backoff: Duration::from_millis(100),
            max_buffer_size: 1000,
            max_buffer_byte_size: 1024 * 1024,
            compression_codec: Codec::None,
            compression_threshold: 1,
            magic: MAGIC_V1,
        }
    }

    pub fn with_required_acks(mut self, required_acks: i16) -> Self {
        self.required_acks = required_acks;
        self
    }

    pub fn with_ack_timeout(mut self, ack_timeout: Duration) -> Self {
        self.ack_timeout = ack_timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn with_max_buffer_size(mut self, max_buffer_size: usize) -> Self {
        self.max_buffer_size = max_buffer_size;
        self
    }

    pub fn with_max_buffer_byte_size(mut self, max_buffer_byte_size: usize) -> Self {
        self.max_buffer_byte_size = max_buffer_byte_size;
        self
    }

    pub fn with_compression(mut self, codec: Codec, threshold: usize) -> Self {
        self.compression_codec = codec;
        self.compression_threshold = threshold;
        self
    }

    pub fn with_magic(mut self, magic: i8) -> Self {
        self.magic = magic;
        self
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a [`Producer`] from a [`Cluster`] and a [`ProducerConfig`],
/// optionally swapping in a custom [`Partitioner`].
pub struct ProducerBuilder {
    cluster: Cluster,
    config: ProducerConfig,
    partitioner: Box<dyn Partitioner>,
}

impl ProducerBuilder {
    pub fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            config: ProducerConfig::new(),
            partitioner: Box::new(DefaultPartitioner),
        }
    }

    pub fn with_config(mut self, config: ProducerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_partitioner(mut self, partitioner: Box<dyn Partitioner>) -> Self {
        self.partitioner = partitioner;
        self
    }

    pub fn build(self) -> Producer {
        Producer {
            cluster: self.cluster,
            config: self.config,
            partitioner: self.partitioner,
            pending: PendingQueue::default(),
            buffer: MessageBuffer::default(),
        }
    }
}

/// Single-threaded, cooperative producer: not safe to call `produce` and
/// `deliver_messages` from different threads concurrently (see the crate's
/// concurrency notes); callers needing that wrap a `Producer` themselves.
pub struct Producer {
    cluster: Cluster,
    config: ProducerConfig,
    partitioner: Box<dyn Partitioner>,
    pending: PendingQueue,
    buffer: MessageBuffer,
}

impl Producer {
    pub fn new(cluster: Cluster, config: ProducerConfig) -> Self {
        ProducerBuilder::new(cluster).with_config(config).build()
    }

    pub fn buffer_size(&self) -> usize {
        self.pending.len() + self.buffer.len()
    }

    pub fn buffer_byte_size(&self) -> usize {
        self.pending.byte_size() + self.buffer.byte_size()
    }

    pub fn clear_buffer(&mut self) {
        self.pending.replace(Vec::new());
        self.buffer.clear();
    }

    pub fn shutdown(&self) {
        self.cluster.disconnect();
    }

    /// Enqueues `record`. Rejects it whole, without enqueueing, if doing so
    /// would reach the configured buffer limits; the target topic is still
    /// registered with the cluster so a later `produce` for the same topic
    /// can succeed once the buffer has room.
    pub fn produce(&mut self, record: Record) -> Result<(), ProducerError> {
        self.cluster.add_target_topics([record.topic.clone()]);

        let would_overflow = self.buffer_size() + 1 >= self.config.max_buffer_size
            || self.buffer_byte_size() + record.byte_size() >= self.config.max_buffer_byte_size;

        if would_overflow {
            return Err(ProducerError::BufferOverflow);
        }

        self.pending.push(record);
        Ok(())
    }

    /// Runs the delivery loop: assign partitions, send, retry up to
    /// `max_retries` times with `retry_backoff` between attempts.
    pub fn deliver_messages(&mut self) -> Result<(), ProducerError> {
        if self.buffer_size() == 0 {
            return Ok(());
        }

        let backoff = Backoff::new(self.config.retry_backoff);
        let mut attempt = 0usize;

        loop {
            attempt += 1;

            if let Err(e) = self.cluster.refresh_metadata_if_necessary() {
                return Err(self.delivery_failed(e));
            }

            self.assign_partitions();

            if let Err(e) = operation::execute(&mut self.buffer, &self.cluster, &self.config) {
                return Err(self.delivery_failed(e));
            }

            if self.config.required_acks == 0 {
                self.buffer.clear();
            }

            if self.buffer_size() == 0 {
                break;
            }

            if attempt <= self.config.max_retries {
                backoff.sleep();
                continue;
            }

            break;
        }

        if !self.pending.is_empty() {
            self.cluster.mark_as_stale();
            return Err(self.delivery_failed(Error::DeliveryIncomplete(
                "failed to assign partitions".to_string(),
            )));
        }
        if !self.buffer.is_empty() {
            return Err(self.delivery_failed(Error::DeliveryIncomplete(
                "failed to send".to_string(),
            )));
        }
        Ok(())
    }

    /// Drains the pending queue into the message buffer using the
    /// partitioner. A topic that fails to assign (no known partitions)
    /// defers all its remaining records in this pass too, so cross-partition
    /// ordering within a topic survives a retry.
    fn assign_partitions(&mut self) {
        let records = self.pending.replace(Vec::new());
        let mut failed_topics = HashSet::new();
        let mut failed = Vec::new();

        for record in records {
            if failed_topics.contains(&record.topic) {
                failed.push(record);
                continue;
            }

            let partition_count = self.cluster.partitions_for(&record.topic).len();
            if partition_count == 0 {
                warn!(topic = %record.topic, "no known partitions, deferring assignment");
                failed_topics.insert(record.topic.clone());
                failed.push(record);
                continue;
            }

            let partition = self.partitioner.partition_for(partition_count, &record);
            self.buffer.push(partition, record);
        }

        if !failed.is_empty() {
            self.cluster.mark_as_stale();
        }
        self.pending.replace(failed);
    }

    fn delivery_failed(&mut self, cause: Error) -> ProducerError {
        let mut undelivered = self.pending.replace(Vec::new());
        undelivered.extend(self.buffer.drain_all());
        ProducerError::DeliveryFailed { cause, undelivered }
    }
}
