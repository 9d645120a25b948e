//! Cluster topology discovery and leader routing.
//!
//! Bootstraps from a list of seed broker URIs, fetches metadata for the
//! topics the caller cares about, and hands out a connected
//! [`BrokerConnection`] for whichever broker currently leads a partition.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::connection::{BrokerConnection, BrokerPool, Topology};
use crate::error::Error;
use crate::protocol::error_code;
use crate::protocol::messages::metadata::MetadataRequest;
use crate::topic::{Partition, Topic};

/// One seed broker address, parsed from a `scheme://host:port` URI.
///
/// `tls` is recorded for introspection only: TLS transport is out of scope
/// for this client (see `DESIGN.md`), so `kafka+ssl://` seeds are accepted
/// and dialed the same way as plain `kafka://` seeds.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SeedBroker {
    host: String,
    port: u16,
    tls: bool,
}

fn parse_seed_uri(uri: &str) -> Result<SeedBroker, Error> {
    let (scheme, rest) = uri.split_once("://").ok_or_else(|| Error::InvalidUri {
        uri: uri.to_string(),
        scheme: String::new(),
    })?;

    let tls = match scheme {
        "kafka" => false,
        "kafka+ssl" => true,
        other => {
            return Err(Error::InvalidUri {
                uri: uri.to_string(),
                scheme: other.to_string(),
            })
        }
    };

    let (host, port) = match rest.split_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| Error::InvalidUri { uri: uri.to_string(), scheme: scheme.to_string() })?;
            (host.to_string(), port)
        }
        None => (rest.to_string(), 9092),
    };

    Ok(SeedBroker { host, port, tls })
}

#[derive(Debug, Clone)]
pub struct ClusterConfig {
    pub seed_brokers: Vec<String>,
    pub socket_timeout: Option<Duration>,
    pub client_id: String,
}

impl ClusterConfig {
    pub fn new(seed_brokers: Vec<String>) -> Self {
        Self {
            seed_brokers,
            socket_timeout: Some(Duration::from_secs(30)),
            client_id: crate::build_info::CLIENT_ID.to_string(),
        }
    }

    pub fn with_socket_timeout(mut self, socket_timeout: Option<Duration>) -> Self {
        self.socket_timeout = socket_timeout;
        self
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }
}

/// Caches the cluster's topology and resolves `(topic, partition)` to a live
/// connection to that partition's leader.
#[derive(Debug)]
pub struct Cluster {
    seeds: Vec<SeedBroker>,
    pool: BrokerPool,
    topology: Topology,
    target_topics: RwLock<HashSet<String>>,
    dirty: AtomicBool,
}

impl Cluster {
    pub fn new(config: ClusterConfig) -> Result<Self, Error> {
        let seeds = config
            .seed_brokers
            .iter()
            .map(|uri| parse_seed_uri(uri))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            seeds,
            pool: BrokerPool::new(config.client_id, config.socket_timeout),
            topology: Topology::default(),
            target_topics: RwLock::new(HashSet::new()),
            dirty: AtomicBool::new(true),
        })
    }

    pub fn add_target_topics<I: IntoIterator<Item = String>>(&self, topics: I) {
        self.target_topics.write().extend(topics);
    }

    pub fn mark_as_stale(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Fetches fresh metadata if the topology is marked stale or any target
    /// topic is missing from the current snapshot.
    pub fn refresh_metadata_if_necessary(&self) -> Result<(), Error> {
        let needs_refresh = self.dirty.load(Ordering::Relaxed)
            || self
                .target_topics
                .read()
                .iter()
                .any(|topic| !self.topology.contains_topic(topic));

        if !needs_refresh {
            return Ok(());
        }

        self.fetch_metadata()
    }

    fn fetch_metadata(&self) -> Result<(), Error> {
        let topics: Vec<String> = self.target_topics.read().iter().cloned().collect();
        let request = MetadataRequest {
            topics: if topics.is_empty() { None } else { Some(topics) },
        };

        for seed in &self.seeds {
            let conn = match self.pool.connect(&seed.host, seed.port) {
                Ok(conn) => conn,
                Err(e) => {
                    debug!(host = %seed.host, port = seed.port, error = %e, "seed broker unreachable");
                    continue;
                }
            };

            match conn.send(&request) {
                Ok(response) => {
                    self.topology.update(&response);
                    self.dirty.store(false, Ordering::Relaxed);
                    return Ok(());
                }
                Err(e) => {
                    warn!(host = %seed.host, port = seed.port, error = %e, "metadata request failed");
                    self.pool.invalidate(&seed.host, seed.port);
                }
            }
        }

        Err(Error::Connection(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "all seed brokers refused connection",
        )))
    }

    /// Resolves the leader of `(topic, partition)`, refreshing metadata once
    /// on a cache miss before giving up.
    pub fn get_leader(&self, topic: &str, partition: i32) -> Result<Arc<BrokerConnection>, Error> {
        if let Some(code) = self.topology.topic_error(topic) {
            return Err(error_code::error_for_code(code));
        }

        let info = match self.topology.partition(topic, partition) {
            Some(info) => info,
            None => {
                // A known topic with a still-unresolved partition doesn't
                // necessarily leave the topology `dirty`, so this refresh
                // must run unconditionally rather than through
                // `refresh_metadata_if_necessary`'s gate.
                self.fetch_metadata()?;
                if let Some(code) = self.topology.topic_error(topic) {
                    return Err(error_code::error_for_code(code));
                }
                if let Some(code) = self.topology.partition_error(topic, partition) {
                    return Err(error_code::error_for_code(code));
                }
                self.topology
                    .partition(topic, partition)
                    .ok_or(Error::UnknownTopicOrPartition)?
            }
        };

        let broker = self
            .topology
            .broker(info.leader_id)
            .ok_or(Error::LeaderNotAvailable)?;

        let port = u16::try_from(broker.port).map_err(|_| Error::LeaderNotAvailable)?;
        self.pool
            .connect(&broker.host, port)
            .map_err(|e| Error::Connection(std::io::Error::new(std::io::ErrorKind::Other, e)))
    }

    pub fn partitions_for(&self, topic: &str) -> Vec<i32> {
        self.topology.partitions_for(topic)
    }

    /// Read-only introspection view of every topic the last metadata refresh
    /// discovered.
    pub fn topics(&self) -> Vec<Topic> {
        let mut by_name: std::collections::BTreeMap<String, Topic> = std::collections::BTreeMap::new();
        for topic_name in self
            .target_topics
            .read()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
        {
            let mut partitions = std::collections::BTreeMap::new();
            for partition_id in self.topology.partitions_for(&topic_name) {
                if let Some(info) = self.topology.partition(&topic_name, partition_id) {
                    partitions.insert(
                        partition_id,
                        Partition {
                            leader_id: info.leader_id,
                            replica_nodes: info.replica_nodes,
                            isr_nodes: info.isr_nodes,
                        },
                    );
                }
            }
            by_name.insert(
                topic_name.clone(),
                Topic {
                    name: topic_name,
                    partitions,
                },
            );
        }
        by_name.into_values().collect()
    }

    pub fn disconnect(&self) {
        self.pool.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_tls_schemes_are_accepted() {
        assert_eq!(
            parse_seed_uri("kafka://kafka").unwrap(),
            SeedBroker { host: "kafka".to_string(), port: 9092, tls: false }
        );
        assert_eq!(
            parse_seed_uri("kafka+ssl://kafka:9093").unwrap(),
            SeedBroker { host: "kafka".to_string(), port: 9093, tls: true }
        );
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = parse_seed_uri("http://kafka").unwrap_err();
        match err {
            Error::InvalidUri { uri, scheme } => {
                assert_eq!(uri, "http://kafka");
                assert_eq!(scheme, "http");
            }
            other => panic!("expected InvalidUri, got {other:?}"),
        }
    }

    #[test]
    fn cluster_rejects_bad_seed_uri_at_construction() {
        let config = ClusterConfig::new(vec!["http://kafka".to_string()]);
        assert!(Cluster::new(config).is_err());
    }
}
