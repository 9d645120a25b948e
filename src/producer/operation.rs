//! One attempt at draining a [`MessageBuffer`]: group by leader, send,
//! interpret per-partition error codes, prune successes.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, warn};

use crate::buffer::MessageBuffer;
use crate::cluster::Cluster;
use crate::compressor;
use crate::connection::BrokerConnection;
use crate::error::Error;
use crate::protocol::error_code;
use crate::protocol::messages::produce::{ProduceRequest, ProduceRequestPartition, ProduceRequestTopic};
use crate::record::Record;
use crate::record_batch::{MessageSet, WireRecord};

use super::ProducerConfig;

struct LeaderBatch {
    connection: Arc<BrokerConnection>,
    topics: HashMap<String, Vec<(i32, Vec<Record>)>>,
}

/// Drains whatever `buffer` currently holds in one pass. Per-partition
/// failures (no leader, a retriable broker error) are handled internally:
/// logged, recorded on `cluster` as stale, and the records are left in
/// `buffer` for the caller's next attempt. Only codec failures propagate,
/// since those indicate a bug rather than a transient condition.
pub fn execute(buffer: &mut MessageBuffer, cluster: &Cluster, config: &ProducerConfig) -> Result<(), Error> {
    let entries: Vec<(String, i32, Vec<Record>)> = buffer
        .iter()
        .map(|(topic, partition, records)| (topic.to_string(), partition, records.to_vec()))
        .collect();

    let mut by_leader: HashMap<(String, u16), LeaderBatch> = HashMap::new();

    for (topic, partition, records) in entries {
        let connection = match cluster.get_leader(&topic, partition) {
            Ok(connection) => connection,
            Err(e) => {
                warn!(topic = %topic, partition, error = %e, "no leader for partition, deferring");
                cluster.mark_as_stale();
                continue;
            }
        };

        let key = (connection.host().to_string(), connection.port());
        by_leader
            .entry(key)
            .or_insert_with(|| LeaderBatch {
                connection: Arc::clone(&connection),
                topics: HashMap::new(),
            })
            .topics
            .entry(topic)
            .or_default()
            .push((partition, records));
    }

    for batch in by_leader.into_values() {
        send_to_leader(batch, buffer, cluster, config)?;
    }

    Ok(())
}

fn send_to_leader(
    batch: LeaderBatch,
    buffer: &mut MessageBuffer,
    cluster: &Cluster,
    config: &ProducerConfig,
) -> Result<(), Error> {
    let mut request_topics = Vec::with_capacity(batch.topics.len());
    let mut sent = Vec::new();

    for (topic, partitions) in &batch.topics {
        let mut request_partitions = Vec::with_capacity(partitions.len());
        for (partition, records) in partitions {
            let set = MessageSet(
                records
                    .iter()
                    .map(|record| to_wire_record(record, config.magic))
                    .collect(),
            );
            let set = compressor::compress(set, config.compression_codec, config.compression_threshold, 0)?;
            let record_set = set.encode()?;
            request_partitions.push(ProduceRequestPartition {
                partition_index: *partition,
                record_set,
            });
            sent.push((topic.clone(), *partition));
        }
        request_topics.push(ProduceRequestTopic {
            name: topic.clone(),
            partitions: request_partitions,
        });
    }

    let request = ProduceRequest {
        required_acks: config.required_acks,
        timeout_ms: i32::try_from(config.ack_timeout.as_millis()).unwrap_or(i32::MAX),
        topics: request_topics,
    };

    if config.required_acks == 0 {
        match batch.connection.send_fire_and_forget(&request) {
            Ok(()) => {
                for (topic, partition) in &sent {
                    buffer.take(topic, *partition);
                }
            }
            Err(e) => {
                error!(error = %e, "fire-and-forget produce request failed");
                cluster.mark_as_stale();
            }
        }
        return Ok(());
    }

    match batch.connection.send(&request) {
        Ok(response) => {
            for topic in response.topics {
                for partition in topic.partitions {
                    if partition.error_code == 0 {
                        buffer.take(&topic.name, partition.partition_index);
                        continue;
                    }

                    let cause = error_code::error_for_code(partition.error_code);
                    if error_code::is_retriable(partition.error_code) {
                        warn!(
                            topic = %topic.name,
                            partition = partition.partition_index,
                            error = %cause,
                            "retriable produce error, leaving records buffered",
                        );
                        cluster.mark_as_stale();
                    } else {
                        error!(
                            topic = %topic.name,
                            partition = partition.partition_index,
                            error = %cause,
                            "non-retriable produce error",
                        );
                    }
                }
            }
        }
        Err(e) => {
            error!(error = %e, "produce request failed");
            cluster.mark_as_stale();
        }
    }

    Ok(())
}

fn to_wire_record(record: &Record, magic: i8) -> WireRecord {
    WireRecord {
        offset: 0,
        magic,
        codec: crate::compression::Codec::None,
        timestamp: record.create_time.map(|t| t.timestamp_millis()),
        key: record.key.clone(),
        value: record.value.clone(),
    }
}
