//! Exercises `Cluster` against a tiny in-process mock broker instead of a
//! real cluster (a server implementation is out of scope for this crate).

use std::io::{Read, Write};
use std::net::TcpListener;

use logcask::cluster::{Cluster, ClusterConfig};
use logcask::protocol::traits::WriteType;

/// Accepts exactly one connection, reads one metadata request, and replies
/// with a single broker, single topic, single partition metadata response
/// whose leader is that same broker.
fn spawn_mock_metadata_broker() -> (String, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let port = addr.port();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();

        let mut size_buf = [0u8; 4];
        stream.read_exact(&mut size_buf).unwrap();
        let size = i32::from_be_bytes(size_buf) as usize;
        let mut body = vec![0u8; size];
        stream.read_exact(&mut body).unwrap();

        // Request envelope: api_key(2) api_version(2) correlation_id(4) ...
        let correlation_id = i32::from_be_bytes(body[4..8].try_into().unwrap());

        let mut resp = Vec::new();
        correlation_id.write(&mut resp).unwrap();

        // brokers: [ { node_id: 1, host, port } ]
        1i32.write(&mut resp).unwrap();
        1i32.write(&mut resp).unwrap();
        "127.0.0.1".to_string().write(&mut resp).unwrap();
        i32::from(port).write(&mut resp).unwrap();

        // controller_id
        1i32.write(&mut resp).unwrap();

        // topics: [ { error_code: 0, name: "orders", partitions: [ { error_code: 0,
        //   partition_index: 0, leader_id: 1, replica_nodes: [], isr_nodes: [] } ] } ]
        1i32.write(&mut resp).unwrap();
        0i16.write(&mut resp).unwrap();
        "orders".to_string().write(&mut resp).unwrap();
        1i32.write(&mut resp).unwrap();
        0i16.write(&mut resp).unwrap();
        0i32.write(&mut resp).unwrap();
        1i32.write(&mut resp).unwrap();
        Vec::<i32>::new().write(&mut resp).unwrap();
        Vec::<i32>::new().write(&mut resp).unwrap();

        let len = i32::try_from(resp.len()).unwrap();
        len.write(&mut stream).unwrap();
        stream.write_all(&resp).unwrap();
    });

    ("127.0.0.1".to_string(), port)
}

#[test]
fn cluster_resolves_leader_via_seed_broker() {
    let (host, port) = spawn_mock_metadata_broker();
    let config = ClusterConfig::new(vec![format!("kafka://{host}:{port}")]);
    let cluster = Cluster::new(config).unwrap();
    cluster.add_target_topics(["orders".to_string()]);

    cluster.refresh_metadata_if_necessary().unwrap();
    assert_eq!(cluster.partitions_for("orders"), vec![0]);

    let conn = cluster.get_leader("orders", 0).unwrap();
    assert_eq!(conn.port(), port);
}

#[test]
fn seed_broker_exhaustion_is_a_connection_error() {
    // Nothing is listening on this port.
    let config = ClusterConfig::new(vec!["kafka://127.0.0.1:1".to_string()]);
    let cluster = Cluster::new(config).unwrap();
    cluster.add_target_topics(["orders".to_string()]);

    let err = cluster.refresh_metadata_if_necessary().unwrap_err();
    assert!(matches!(err, logcask::Error::Connection(_)));
}
