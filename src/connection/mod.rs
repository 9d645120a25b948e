//! Broker connections: a single TCP session, a pool keyed by address, and
//! the cached topology snapshot that maps node ids and topics to addresses.

pub mod pool;
pub mod topology;
pub mod transport;

pub use pool::BrokerPool;
pub use topology::{BrokerInfo, PartitionInfo, Topology};
pub use transport::BrokerConnection;
