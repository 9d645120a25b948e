use std::io::{Read, Write};

use crate::protocol::traits::{ReadError, ReadType, WriteError, WriteType};

/// Fixed at the wire version this client speaks (no cross-version
/// negotiation); see `RequestBody` in `protocol::messages`.
#[derive(Debug)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct MetadataRequest {
    /// Requests metadata for all topics when `None`.
    pub topics: Option<Vec<String>>,
}

impl<W: Write> WriteType<W> for MetadataRequest {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        match &self.topics {
            Some(topics) => topics.write(writer)?,
            None => Vec::<String>::new().write(writer)?,
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct MetadataResponse {
    pub brokers: Vec<MetadataResponseBroker>,
    pub controller_id: i32,
    pub topics: Vec<MetadataResponseTopic>,
}

impl<R: Read> ReadType<R> for MetadataResponse {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let brokers = read_array(reader)?;
        let controller_id = i32::read(reader)?;
        let topics = read_array(reader)?;

        Ok(Self {
            brokers,
            controller_id,
            topics,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct MetadataResponseBroker {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

impl<R: Read> ReadType<R> for MetadataResponseBroker {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            node_id: i32::read(reader)?,
            host: String::read(reader)?,
            port: i32::read(reader)?,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct MetadataResponseTopic {
    /// The protocol error code for this topic, 0 if none.
    pub error_code: i16,
    pub name: String,
    pub partitions: Vec<MetadataResponsePartition>,
}

impl<R: Read> ReadType<R> for MetadataResponseTopic {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            error_code: i16::read(reader)?,
            name: String::read(reader)?,
            partitions: read_array(reader)?,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct MetadataResponsePartition {
    /// The protocol error code for this partition, 0 if none.
    pub error_code: i16,
    pub partition_index: i32,
    pub leader_id: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
}

impl<R: Read> ReadType<R> for MetadataResponsePartition {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            error_code: i16::read(reader)?,
            partition_index: i32::read(reader)?,
            leader_id: i32::read(reader)?,
            replica_nodes: Vec::<i32>::read(reader)?,
            isr_nodes: Vec::<i32>::read(reader)?,
        })
    }
}

/// `MetadataResponse`'s arrays are themselves made of structs, not the
/// primitive int32/string arrays `primitives` already covers, so reads walk
/// them manually: int32 count followed by that many elements, `-1` meaning
/// empty (the legacy wire format never sends a null array here).
fn read_array<R, T>(reader: &mut R) -> Result<Vec<T>, ReadError>
where
    R: Read,
    T: ReadType<R>,
{
    let len = i32::read(reader)?;
    if len <= 0 {
        return Ok(Vec::new());
    }
    let len = usize::try_from(len)?;
    let mut out = Vec::with_capacity(len.min(4096));
    for _ in 0..len {
        out.push(T::read(reader)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use crate::protocol::test_utils::test_roundtrip;

    use super::*;

    test_roundtrip!(MetadataResponseBroker, test_roundtrip_broker);
    test_roundtrip!(MetadataResponsePartition, test_roundtrip_partition);

    #[test]
    fn no_topics_requests_all() {
        let mut buf = Vec::new();
        MetadataRequest { topics: None }.write(&mut buf).unwrap();
        assert_eq!(buf, vec![0xff, 0xff, 0xff, 0xff]);
    }
}
