use std::io::{Read, Write};

use crate::protocol::api_key::ApiKey;
use crate::protocol::api_version::ApiVersion;
use crate::protocol::traits::{ReadError, ReadType, WriteError, WriteType};

/// Request envelope header.
///
/// This client targets the pre-"flexible version" wire format throughout, so
/// unlike the upstream protocol this header never carries tagged fields.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct RequestHeader {
    pub request_api_key: ApiKey,
    pub request_api_version: ApiVersion,
    pub correlation_id: i32,
    pub client_id: Option<String>,
}

impl<R: Read> ReadType<R> for RequestHeader {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            request_api_key: ApiKey::from(i16::read(reader)?),
            request_api_version: ApiVersion(i16::read(reader)?),
            correlation_id: i32::read(reader)?,
            client_id: Option::<String>::read(reader)?,
        })
    }
}

impl<W: Write> WriteType<W> for RequestHeader {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        i16::from(self.request_api_key).write(writer)?;
        self.request_api_version.0.write(writer)?;
        self.correlation_id.write(writer)?;
        self.client_id.write(writer)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct ResponseHeader {
    pub correlation_id: i32,
}

impl<R: Read> ReadType<R> for ResponseHeader {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        Ok(Self {
            correlation_id: i32::read(reader)?,
        })
    }
}

impl<W: Write> WriteType<W> for ResponseHeader {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        self.correlation_id.write(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::test_utils::test_roundtrip;

    use super::*;

    test_roundtrip!(RequestHeader, test_roundtrip_request_header);
    test_roundtrip!(ResponseHeader, test_roundtrip_response_header);
}
