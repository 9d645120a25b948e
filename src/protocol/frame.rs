//! Request/response envelope framing.
//!
//! Request: `int32 size | int16 api_key | int16 api_version | int32 correlation_id
//!     | nullable_string client_id | body`. Response: `int32 size | int32 correlation_id | body`.
//! `size` covers everything after itself.

use std::io::{Cursor, Read, Write};

use super::messages::header::{RequestHeader, ResponseHeader};
use super::traits::{ReadError, ReadType, WriteError, WriteType};
use super::vec_builder::VecBuilder;

/// Writes a full request frame: header followed by body, prefixed with the
/// overall size.
pub fn write_request<W, B>(writer: &mut W, header: &RequestHeader, body: &B) -> Result<(), WriteError>
where
    W: Write,
    B: WriteType<Vec<u8>>,
{
    let mut buf = Vec::new();
    header.write(&mut buf)?;
    body.write(&mut buf)?;

    let size = i32::try_from(buf.len()).map_err(WriteError::Overflow)?;
    size.write(writer)?;
    writer.write_all(&buf)?;
    Ok(())
}

/// Reads a full response frame and decodes its body, returning the
/// correlation id so the caller can match it against the request it sent.
pub fn read_response<R, B>(reader: &mut R) -> Result<(i32, B), ReadError>
where
    R: Read,
    B: ReadType<Cursor<Vec<u8>>>,
{
    let size = i32::read(reader)?;
    let size = usize::try_from(size)?;
    let buf: Vec<u8> = VecBuilder::new(size).read_exact(reader)?.into();

    let mut cursor = Cursor::new(buf);
    let header = ResponseHeader::read(&mut cursor)?;
    let body = B::read(&mut cursor)?;
    Ok((header.correlation_id, body))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor as IoCursor;

    use crate::protocol::api_key::ApiKey;
    use crate::protocol::api_version::ApiVersion;
    use crate::protocol::messages::metadata::MetadataRequest;

    use super::*;

    #[test]
    fn request_frame_is_size_prefixed() {
        let header = RequestHeader {
            request_api_key: ApiKey::Metadata,
            request_api_version: ApiVersion(0),
            correlation_id: 7,
            client_id: Some("test".to_string()),
        };
        let body = MetadataRequest { topics: None };

        let mut buf = Vec::new();
        write_request(&mut buf, &header, &body).unwrap();

        let mut cursor = IoCursor::new(&buf[..]);
        let declared_size = i32::read(&mut cursor).unwrap() as usize;
        assert_eq!(declared_size, buf.len() - 4);
    }
}
