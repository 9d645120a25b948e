//! A minimal, blocking client for the Kafka wire protocol: cluster topology
//! discovery, a retrying produce pipeline, and the binary codec underneath
//! both.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use logcask::cluster::{Cluster, ClusterConfig};
//! use logcask::producer::{Producer, ProducerConfig};
//! use logcask::record::Record;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cluster = Cluster::new(
//!     ClusterConfig::new(vec!["kafka://localhost:9092".to_string()])
//!         .with_socket_timeout(Some(Duration::from_secs(10))),
//! )?;
//! let mut producer = Producer::new(cluster, ProducerConfig::new());
//!
//! producer.produce(Record::new("orders", Some(b"hello".to_vec())))?;
//! producer.deliver_messages()?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod buffer;
pub mod build_info;
pub mod cluster;
pub mod compression;
pub mod compressor;
pub mod connection;
pub mod error;
pub mod partitioner;
pub mod producer;
pub mod protocol;
pub mod record;
pub mod record_batch;
pub mod topic;

pub use cluster::{Cluster, ClusterConfig};
pub use error::{Error, ProducerError};
pub use producer::{Producer, ProducerBuilder, ProducerConfig};
pub use record::Record;
