//! A lazy, unbounded cache of [`BrokerConnection`]s keyed by `(host, port)`.
//!
//! The pool never dials by node id alone — resolving a node id to a
//! `(host, port)` pair is the [`crate::cluster::Cluster`]'s job.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use super::transport::{BrokerConnection, Error};

#[derive(Debug)]
pub struct BrokerPool {
    client_id: String,
    socket_timeout: Option<Duration>,
    connections: RwLock<HashMap<(String, u16), Arc<BrokerConnection>>>,
}

impl BrokerPool {
    pub fn new(client_id: String, socket_timeout: Option<Duration>) -> Self {
        Self {
            client_id,
            socket_timeout,
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a cached connection for `(host, port)`, opening one if none
    /// exists yet.
    pub fn connect(&self, host: &str, port: u16) -> Result<Arc<BrokerConnection>, Error> {
        let key = (host.to_string(), port);

        if let Some(conn) = self.connections.read().get(&key) {
            return Ok(Arc::clone(conn));
        }

        let conn = Arc::new(BrokerConnection::connect(
            host,
            port,
            self.client_id.clone(),
            self.socket_timeout,
        )?);
        self.connections.write().insert(key, Arc::clone(&conn));
        Ok(conn)
    }

    /// Drops a connection the caller has observed to be broken, so the next
    /// `connect` for this address opens a fresh one instead of reusing it.
    pub fn invalidate(&self, host: &str, port: u16) {
        self.connections.write().remove(&(host.to_string(), port));
    }

    pub fn close_all(&self) {
        self.connections.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_on_unknown_address_is_a_no_op() {
        let pool = BrokerPool::new("test".to_string(), None);
        pool.invalidate("nowhere", 9092);
    }
}
