use std::io::{Read, Write};

use crate::protocol::traits::{ReadError, ReadType, WriteError, WriteType};

#[derive(Debug)]
pub struct ProduceRequest {
    /// `0` = fire and forget, `1` = leader only, `-1` = all in-sync replicas.
    pub required_acks: i16,
    /// Broker-side hint; this client does not enforce it client-side.
    pub timeout_ms: i32,
    pub topics: Vec<ProduceRequestTopic>,
}

impl<W: Write> WriteType<W> for ProduceRequest {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        self.required_acks.write(writer)?;
        self.timeout_ms.write(writer)?;
        write_array(writer, &self.topics)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct ProduceRequestTopic {
    pub name: String,
    pub partitions: Vec<ProduceRequestPartition>,
}

impl<W: Write> WriteType<W> for ProduceRequestTopic {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        self.name.write(writer)?;
        write_array(writer, &self.partitions)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct ProduceRequestPartition {
    pub partition_index: i32,
    /// The encoded message set (see [`crate::record_batch`]), already
    /// compressed if applicable.
    pub record_set: Vec<u8>,
}

impl<W: Write> WriteType<W> for ProduceRequestPartition {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        self.partition_index.write(writer)?;
        self.record_set.write(writer)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProduceResponse {
    pub topics: Vec<ProduceResponseTopic>,
}

impl<R: Read> ReadType<R> for ProduceResponse {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            topics: read_array(reader)?,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProduceResponseTopic {
    pub name: String,
    pub partitions: Vec<ProduceResponsePartition>,
}

impl<R: Read> ReadType<R> for ProduceResponseTopic {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            name: String::read(reader)?,
            partitions: read_array(reader)?,
        })
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProduceResponsePartition {
    pub partition_index: i32,
    pub error_code: i16,
    pub base_offset: i64,
}

impl<R: Read> ReadType<R> for ProduceResponsePartition {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            partition_index: i32::read(reader)?,
            error_code: i16::read(reader)?,
            base_offset: i64::read(reader)?,
        })
    }
}

fn write_array<W, T>(writer: &mut W, items: &[T]) -> Result<(), WriteError>
where
    W: Write,
    T: WriteType<W>,
{
    let len = i32::try_from(items.len()).map_err(WriteError::Overflow)?;
    len.write(writer)?;
    for item in items {
        item.write(writer)?;
    }
    Ok(())
}

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
    use std::io::Cursor;

    use super::*;

    #[test]
    fn roundtrips_a_request() {
        let request = ProduceRequest {
            required_acks: 1,
            timeout_ms: 1500,
            topics: vec![ProduceRequestTopic {
                name: "orders".to_string(),
                partitions: vec![ProduceRequestPartition {
                    partition_index: 0,
                    record_set: vec![1, 2, 3],
                }],
            }],
        };

        let mut buf = Vec::new();
        request.write(&mut buf).unwrap();
        assert!(!buf.is_empty());
    }

    #[test]
    fn roundtrips_a_response() {
        let response = ProduceResponse {
            topics: vec![ProduceResponseTopic {
                name: "orders".to_string(),
                partitions: vec![ProduceResponsePartition {
                    partition_index: 0,
                    error_code: 0,
                    base_offset: 42,
                }],
            }],
        };

        let decoded = ProduceResponse::read(&mut Cursor::new(encode(&response))).unwrap();
        assert_eq!(decoded, response);
    }

    fn encode(response: &ProduceResponse) -> Vec<u8> {
        let mut buf = Vec::new();
        i32::try_from(response.topics.len())
            .unwrap()
            .write(&mut buf)
            .unwrap();
        for topic in &response.topics {
            topic.name.write(&mut buf).unwrap();
            i32::try_from(topic.partitions.len())
                .unwrap()
                .write(&mut buf)
                .unwrap();
            for partition in &topic.partitions {
                partition.partition_index.write(&mut buf).unwrap();
                partition.error_code.write(&mut buf).unwrap();
                partition.base_offset.write(&mut buf).unwrap();
            }
        }
        buf
    }
}
