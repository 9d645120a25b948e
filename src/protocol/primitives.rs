//! Primitive wire types for the subset of the protocol this client speaks:
//! plain (non-compact, non-tagged-field) integers, strings, byte blobs and
//! arrays.
//!
//! # References
//! - <https://kafka.apache.org/protocol#protocol_types>

use std::io::{Read, Write};

use super::traits::{ReadError, ReadType, WriteError, WriteType};
use super::vec_builder::VecBuilder;

impl<R: Read> ReadType<R> for bool {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(buf[0] != 0)
    }
}

impl<W: Write> WriteType<W> for bool {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        writer.write_all(&[u8::from(*self)])?;
        Ok(())
    }
}

impl<R: Read> ReadType<R> for i8 {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let mut buf = [0u8; 1];
        reader.read_exact(&mut buf)?;
        Ok(i8::from_be_bytes(buf))
    }
}

impl<W: Write> WriteType<W> for i8 {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        writer.write_all(&self.to_be_bytes())?;
        Ok(())
    }
}

impl<R: Read> ReadType<R> for i16 {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }
}

impl<W: Write> WriteType<W> for i16 {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        writer.write_all(&self.to_be_bytes())?;
        Ok(())
    }
}

impl<R: Read> ReadType<R> for i32 {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        Ok(i32::from_be_bytes(buf))
    }
}

impl<W: Write> WriteType<W> for i32 {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        writer.write_all(&self.to_be_bytes())?;
        Ok(())
    }
}

impl<R: Read> ReadType<R> for i64 {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        Ok(i64::from_be_bytes(buf))
    }
}

impl<W: Write> WriteType<W> for i64 {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        writer.write_all(&self.to_be_bytes())?;
        Ok(())
    }
}

/// A UTF-8 string. First the length `N` is given as an INT16, then `N` bytes
/// of UTF-8 follow. Non-nullable: callers needing a null encode
/// `Option<String>` instead.
impl<R: Read> ReadType<R> for String {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let len = i16::read(reader)?;
        let len = usize::try_from(len).map_err(|e| ReadError::Malformed(Box::new(e)))?;
        let buf: Vec<u8> = VecBuilder::new(len).read_exact(reader)?.into();
        String::from_utf8(buf).map_err(|e| ReadError::Malformed(Box::new(e)))
    }
}

impl<W: Write> WriteType<W> for String {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        let len = i16::try_from(self.len()).map_err(WriteError::Overflow)?;
        len.write(writer)?;
        writer.write_all(self.as_bytes())?;
        Ok(())
    }
}

/// A sequence of characters or null: length `-1` means absent, any other
/// non-negative length is the UTF-8 byte count that follows.
impl<R: Read> ReadType<R> for Option<String> {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let len = i16::read(reader)?;
        match len {
            l if l < -1 => Err(ReadError::Malformed(
                format!("invalid negative length for nullable string: {l}").into(),
            )),
            -1 => Ok(None),
            l => {
                let len = usize::try_from(l)?;
                let buf: Vec<u8> = VecBuilder::new(len).read_exact(reader)?.into();
                String::from_utf8(buf)
                    .map(Some)
                    .map_err(|e| ReadError::Malformed(Box::new(e)))
            }
        }
    }
}

impl<W: Write> WriteType<W> for Option<String> {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        match self {
            Some(s) => s.write(writer),
            None => (-1i16).write(writer),
        }
    }
}

/// Nullable byte blob: INT32 length, `-1` meaning absent.
impl<R: Read> ReadType<R> for Option<Vec<u8>> {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let len = i32::read(reader)?;
        match len {
            l if l < -1 => Err(ReadError::Malformed(
                format!("invalid negative length for nullable bytes: {l}").into(),
            )),
            -1 => Ok(None),
            l => {
                let len = usize::try_from(l)?;
                let buf: Vec<u8> = VecBuilder::new(len).read_exact(reader)?.into();
                Ok(Some(buf))
            }
        }
    }
}

impl<W: Write> WriteType<W> for Option<Vec<u8>> {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        match self {
            Some(buf) => {
                let len = i32::try_from(buf.len()).map_err(WriteError::Overflow)?;
                len.write(writer)?;
                writer.write_all(buf)?;
                Ok(())
            }
            None => (-1i32).write(writer),
        }
    }
}

/// Non-nullable byte blob: INT32 length, must be `>= 0`.
impl<R: Read> ReadType<R> for Vec<u8> {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let len = i32::read(reader)?;
        if len < 0 {
            return Err(ReadError::Malformed(
                format!("invalid length for bytes: {len}").into(),
            ));
        }
        let len = usize::try_from(len)?;
        Ok(VecBuilder::new(len).read_exact(reader)?.into())
    }
}

impl<W: Write> WriteType<W> for Vec<u8> {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        let len = i32::try_from(self.len()).map_err(WriteError::Overflow)?;
        len.write(writer)?;
        writer.write_all(self)?;
        Ok(())
    }
}

/// `ARRAY<STRING>`: INT32 count, `-1` meaning empty/absent.
impl<R: Read> ReadType<R> for Vec<String> {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let len = i32::read(reader)?;
        if len <= 0 {
            return Ok(Vec::new());
        }
        let len = usize::try_from(len)?;
        let mut out = VecBuilder::new(len);
        for _ in 0..len {
            out.push(String::read(reader)?);
        }
        Ok(out.into())
    }
}

impl<W: Write> WriteType<W> for Vec<String> {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        if self.is_empty() {
            return (-1i32).write(writer);
        }
        let len = i32::try_from(self.len()).map_err(WriteError::Overflow)?;
        len.write(writer)?;
        for item in self {
            item.write(writer)?;
        }
        Ok(())
    }
}

/// `ARRAY<INT32>`: INT32 count, `-1` meaning empty/absent.
impl<R: Read> ReadType<R> for Vec<i32> {
    fn read(reader: &mut R) -> Result<Self, ReadError> {
        let len = i32::read(reader)?;
        if len <= 0 {
            return Ok(Vec::new());
        }
        let len = usize::try_from(len)?;
        let mut out = VecBuilder::new(len);
        for _ in 0..len {
            out.push(i32::read(reader)?);
        }
        Ok(out.into())
    }
}

impl<W: Write> WriteType<W> for Vec<i32> {
    fn write(&self, writer: &mut W) -> Result<(), WriteError> {
        if self.is_empty() {
            return (-1i32).write(writer);
        }
        let len = i32::try_from(self.len()).map_err(WriteError::Overflow)?;
        len.write(writer)?;
        for item in self {
            item.write(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use crate::protocol::test_utils::test_roundtrip;

    use super::*;

    test_roundtrip!(bool, test_bool_roundtrip);
    test_roundtrip!(i8, test_i8_roundtrip);
    test_roundtrip!(i16, test_i16_roundtrip);
    test_roundtrip!(i32, test_i32_roundtrip);
    test_roundtrip!(i64, test_i64_roundtrip);
    test_roundtrip!(String, test_string_roundtrip);
    test_roundtrip!(Option<String>, test_nullable_string_roundtrip);
    test_roundtrip!(Vec<i32>, test_array_i32_roundtrip);

    #[test]
    fn boolean_decode_treats_any_nonzero_as_true() {
        assert!(!bool::read(&mut Cursor::new(vec![0])).unwrap());
        for v in [1u8, 35, 255] {
            assert!(bool::read(&mut Cursor::new(vec![v])).unwrap());
        }
    }

    #[test]
    fn nullable_string_rejects_negative_length_below_sentinel() {
        let mut buf = Vec::new();
        (-2i16).write(&mut buf).unwrap();

        let err = Option::<String>::read(&mut Cursor::new(buf)).unwrap_err();
        assert_matches!(err, ReadError::Malformed(_));
    }

    #[test]
    fn nullable_bytes_rejects_negative_length_below_sentinel() {
        let mut buf = Vec::new();
        (-2i32).write(&mut buf).unwrap();

        let err = Option::<Vec<u8>>::read(&mut Cursor::new(buf)).unwrap_err();
        assert_matches!(err, ReadError::Malformed(_));
    }

    #[test]
    fn declared_length_past_the_buffer_truncates_instead_of_blowing_up_memory() {
        let mut buf = Vec::new();
        i16::MAX.write(&mut buf).unwrap();

        let err = String::read(&mut Cursor::new(buf)).unwrap_err();
        assert_matches!(err, ReadError::IO(_));
    }
}
