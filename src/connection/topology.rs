//! The cluster's cached view of brokers and partition leadership.
//!
//! Unlike a topology cache that merges broker-by-broker, this one is
//! replaced as a whole on every metadata refresh: a snapshot is built up
//! from a single `MetadataResponse` and then swapped in atomically, so a
//! reader never observes a mix of old and new broker/partition data.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::protocol::messages::metadata::{MetadataResponse, MetadataResponseBroker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerInfo {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

impl fmt::Display for BrokerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<&MetadataResponseBroker> for BrokerInfo {
    fn from(b: &MetadataResponseBroker) -> Self {
        Self {
            node_id: b.node_id,
            host: b.host.clone(),
            port: b.port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    pub leader_id: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
struct Snapshot {
    brokers: HashMap<i32, BrokerInfo>,
    partitions: HashMap<(String, i32), PartitionInfo>,
    controller_id: Option<i32>,
    /// Per-topic metadata error, if the broker reported one (e.g. invalid
    /// topic name). Checked by `Cluster::get_leader`/`partitions_for`.
    topic_errors: HashMap<String, i16>,
    /// Per-partition metadata error (e.g. leader not available), for topics
    /// that are otherwise known but whose partition failed to resolve.
    partition_errors: HashMap<(String, i32), i16>,
}

/// Holds the current snapshot behind a lock that is only ever acquired to
/// read the whole thing or replace the whole thing — never to mutate a
/// single entry.
#[derive(Debug, Default)]
pub struct Topology {
    snapshot: RwLock<Snapshot>,
}

impl Topology {
    pub fn is_empty(&self) -> bool {
        self.snapshot.read().brokers.is_empty()
    }

    pub fn broker(&self, node_id: i32) -> Option<BrokerInfo> {
        self.snapshot.read().brokers.get(&node_id).cloned()
    }

    pub fn brokers(&self) -> Vec<BrokerInfo> {
        self.snapshot.read().brokers.values().cloned().collect()
    }

    pub fn partition(&self, topic: &str, partition: i32) -> Option<PartitionInfo> {
        self.snapshot
            .read()
            .partitions
            .get(&(topic.to_string(), partition))
            .cloned()
    }

    pub fn partitions_for(&self, topic: &str) -> Vec<i32> {
        self.snapshot
            .read()
            .partitions
            .keys()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| *p)
            .collect()
    }

    pub fn topic_error(&self, topic: &str) -> Option<i16> {
        self.snapshot.read().topic_errors.get(topic).copied()
    }

    pub fn partition_error(&self, topic: &str, partition: i32) -> Option<i16> {
        self.snapshot
            .read()
            .partition_errors
            .get(&(topic.to_string(), partition))
            .copied()
    }

    pub fn controller_id(&self) -> Option<i32> {
        self.snapshot.read().controller_id
    }

    pub fn controller(&self) -> Option<BrokerInfo> {
        let snapshot = self.snapshot.read();
        let controller_id = snapshot.controller_id?;
        snapshot.brokers.get(&controller_id).cloned()
    }

    pub fn contains_topic(&self, topic: &str) -> bool {
        self.snapshot
            .read()
            .partitions
            .keys()
            .any(|(t, _)| t == topic)
            || self.snapshot.read().topic_errors.contains_key(topic)
    }

    /// Builds a fresh snapshot from `response` in full and swaps it in
    /// atomically. Nothing from the previous snapshot survives: a topic or
    /// partition absent from `response` is simply absent afterward.
    pub fn update(&self, response: &MetadataResponse) {
        let mut next = Snapshot {
            brokers: response
                .brokers
                .iter()
                .map(|b| (b.node_id, BrokerInfo::from(b)))
                .collect(),
            controller_id: Some(response.controller_id),
            ..Snapshot::default()
        };

        for topic in &response.topics {
            if topic.error_code != 0 {
                next.topic_errors.insert(topic.name.clone(), topic.error_code);
                continue;
            }

            for partition in &topic.partitions {
                let key = (topic.name.clone(), partition.partition_index);
                if partition.error_code != 0 {
                    next.partition_errors.insert(key, partition.error_code);
                    continue;
                }
                next.partitions.insert(
                    key,
                    PartitionInfo {
                        leader_id: partition.leader_id,
                        replica_nodes: partition.replica_nodes.clone(),
                        isr_nodes: partition.isr_nodes.clone(),
                    },
                );
            }
        }

        *self.snapshot.write() = next;
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::messages::metadata::{MetadataResponsePartition, MetadataResponseTopic};

    use super::*;

    fn response() -> MetadataResponse {
        MetadataResponse {
            brokers: vec![MetadataResponseBroker {
                node_id: 1,
                host: "broker-1".to_string(),
                port: 9092,
            }],
            controller_id: 1,
            topics: vec![MetadataResponseTopic {
                error_code: 0,
                name: "orders".to_string(),
                partitions: vec![MetadataResponsePartition {
                    error_code: 0,
                    partition_index: 0,
                    leader_id: 1,
                    replica_nodes: vec![1],
                    isr_nodes: vec![1],
                }],
            }],
        }
    }

    #[test]
    fn update_replaces_the_whole_snapshot() {
        let topology = Topology::default();
        assert!(topology.is_empty());

        topology.update(&response());
        assert!(!topology.is_empty());
        assert_eq!(topology.partitions_for("orders"), vec![0]);
        assert_eq!(topology.controller_id(), Some(1));
    }

    #[test]
    fn topic_error_is_tracked_and_partitions_cleared() {
        let mut resp = response();
        resp.topics[0].error_code = 17;
        resp.topics[0].partitions.clear();

        let topology = Topology::default();
        topology.update(&resp);

        assert_eq!(topology.topic_error("orders"), Some(17));
        assert!(topology.partitions_for("orders").is_empty());
    }

    #[test]
    fn partition_error_is_tracked_independently_of_topic() {
        let mut resp = response();
        resp.topics[0].partitions[0].error_code = 5;

        let topology = Topology::default();
        topology.update(&resp);

        assert_eq!(topology.topic_error("orders"), None);
        assert_eq!(topology.partition_error("orders", 0), Some(5));
        assert!(topology.partition("orders", 0).is_none());
    }
}
