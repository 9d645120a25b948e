use std::thread;
use std::time::Duration;

use logcask::cluster::{Cluster, ClusterConfig};
use logcask::producer::{Producer, ProducerConfig};
use logcask::record::Record;

const TOPIC: &str = "test";

fn main() {
    tracing_subscriber::fmt::init();

    let seed_brokers = vec![
        "kafka://localhost:9010".to_string(),
        "kafka://localhost:9011".to_string(),
    ];
    let cluster = Cluster::new(ClusterConfig::new(seed_brokers)).expect("valid seed broker uris");
    let mut producer = Producer::new(cluster, ProducerConfig::new().with_required_acks(1));

    let mut index = 0u64;
    loop {
        for partition in 0..3 {
            let record = Record::new(TOPIC, Some(format!("hello: {partition} {index}").into_bytes()))
                .with_partition(partition);
            producer.produce(record).expect("buffer has room");
        }

        if let Err(e) = producer.deliver_messages() {
            eprintln!("delivery failed: {e}");
        }

        index += 1;
        thread::sleep(Duration::from_secs(1));
    }
}
