//! Wrapper-record compression for message sets.
//!
//! A compressed [`MessageSet`](crate::record_batch::MessageSet) is
//! represented on the wire as a single record whose attribute byte's low 3
//! bits name the codec and whose value is the codec-compressed encoding of
//! the inner records. See `record_batch` for how the wrapper is built and
//! unwrapped.

use crate::error::Error;

/// Compression codec, identified by the low 3 bits of a wire record's
/// attribute byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    None,
    Gzip,
    Snappy,
}

impl Codec {
    pub fn from_attributes(attributes: i8) -> Self {
        match attributes & 0x07 {
            1 => Codec::Gzip,
            2 => Codec::Snappy,
            _ => Codec::None,
        }
    }

    pub fn to_attributes(self) -> i8 {
        match self {
            Codec::None => 0,
            Codec::Gzip => 1,
            Codec::Snappy => 2,
        }
    }
}

pub fn compress(codec: Codec, data: &[u8]) -> Result<Vec<u8>, Error> {
    match codec {
        Codec::None => Ok(data.to_vec()),
        Codec::Gzip => compress_gzip(data),
        Codec::Snappy => compress_snappy(data),
    }
}

pub fn decompress(codec: Codec, data: &[u8]) -> Result<Vec<u8>, Error> {
    match codec {
        Codec::None => Ok(data.to_vec()),
        Codec::Gzip => decompress_gzip(data),
        Codec::Snappy => decompress_snappy(data),
    }
}

#[cfg(feature = "compression-gzip")]
fn compress_gzip(data: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::Corrupt(format!("gzip compression failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| Error::Corrupt(format!("gzip compression failed: {e}")))
}

#[cfg(not(feature = "compression-gzip"))]
fn compress_gzip(_data: &[u8]) -> Result<Vec<u8>, Error> {
    Err(Error::Corrupt(
        "gzip support was not compiled into this build".into(),
    ))
}

#[cfg(feature = "compression-gzip")]
fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Read;

    use flate2::read::GzDecoder;

    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| Error::Corrupt(format!("gzip decompression failed: {e}")))?;
    Ok(out)
}

#[cfg(not(feature = "compression-gzip"))]
fn decompress_gzip(_data: &[u8]) -> Result<Vec<u8>, Error> {
    Err(Error::Corrupt(
        "gzip support was not compiled into this build".into(),
    ))
}

#[cfg(feature = "compression-snappy")]
fn compress_snappy(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = snap::raw::Encoder::new();
    encoder
        .compress_vec(data)
        .map_err(|e| Error::Corrupt(format!("snappy compression failed: {e}")))
}

#[cfg(not(feature = "compression-snappy"))]
fn compress_snappy(_data: &[u8]) -> Result<Vec<u8>, Error> {
    Err(Error::Corrupt(
        "snappy support was not compiled into this build".into(),
    ))
}

#[cfg(feature = "compression-snappy")]
fn decompress_snappy(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = snap::raw::Decoder::new();
    decoder
        .decompress_vec(data)
        .map_err(|e| Error::Corrupt(format!("snappy decompression failed: {e}")))
}

#[cfg(not(feature = "compression-snappy"))]
fn decompress_snappy(_data: &[u8]) -> Result<Vec<u8>, Error> {
    Err(Error::Corrupt(
        "snappy support was not compiled into this build".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_byte_roundtrip() {
        for codec in [Codec::None, Codec::Gzip, Codec::Snappy] {
            assert_eq!(Codec::from_attributes(codec.to_attributes()), codec);
        }
    }

    #[test]
    fn unknown_low_bits_fall_back_to_none() {
        assert_eq!(Codec::from_attributes(0x07), Codec::None);
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_roundtrip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = compress(Codec::Gzip, &data).unwrap();
        assert!(compressed.len() < data.len());
        let restored = decompress(Codec::Gzip, &compressed).unwrap();
        assert_eq!(restored, data);
    }

    #[cfg(feature = "compression-snappy")]
    #[test]
    fn snappy_roundtrip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);
        let compressed = compress(Codec::Snappy, &data).unwrap();
        let restored = decompress(Codec::Snappy, &compressed).unwrap();
        assert_eq!(restored, data);
    }
}
