//! A `Vec` builder that grows incrementally instead of trusting a
//! wire-supplied length up front.
//!
//! Every length-prefixed primitive in [`primitives`](super::primitives) reads
//! its declared length from untrusted input before it knows whether that many
//! bytes actually follow. Pre-allocating `Vec::with_capacity(len)` directly
//! would let a single corrupt or adversarial frame trigger an enormous
//! allocation. `VecBuilder` reserves in bounded chunks and only ever holds as
//! much capacity as it has actually filled plus one chunk, so a bogus length
//! degrades to a normal `TRUNCATED` read error instead of an OOM abort.

use std::io::Read;

use super::traits::{ReadError, ReadType};

/// Reservations never exceed this many elements at a time.
const CHUNK: usize = 4096;

#[derive(Debug)]
pub struct VecBuilder<T> {
    target_len: usize,
    inner: Vec<T>,
}

impl<T> VecBuilder<T> {
    pub fn new(target_len: usize) -> Self {
        Self {
            target_len,
            inner: Vec::with_capacity(target_len.min(CHUNK)),
        }
    }

    pub fn push(&mut self, value: T) {
        if self.inner.len() == self.inner.capacity() {
            let remaining = self.target_len.saturating_sub(self.inner.len());
            self.inner.reserve(remaining.min(CHUNK).max(1));
        }
        self.inner.push(value);
    }
}

impl<T> From<VecBuilder<T>> for Vec<T> {
    fn from(builder: VecBuilder<T>) -> Self {
        builder.inner
    }
}

impl VecBuilder<u8> {
    /// Reads exactly `target_len` bytes, growing the backing buffer in
    /// [`CHUNK`]-sized steps so a huge bogus length fails with a normal I/O
    /// error rather than an allocation.
    pub fn read_exact<R>(mut self, reader: &mut R) -> Result<Self, ReadError>
    where
        R: Read,
    {
        let mut remaining = self.target_len;
        let mut chunk = vec![0u8; 0];
        while remaining > 0 {
            let take = remaining.min(CHUNK);
            chunk.resize(take, 0);
            reader.read_exact(&mut chunk)?;
            self.inner.extend_from_slice(&chunk);
            remaining -= take;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn reads_exact_bytes() {
        let data = vec![1u8, 2, 3, 4, 5];
        let mut cursor = Cursor::new(data.clone());
        let builder = VecBuilder::<u8>::new(5).read_exact(&mut cursor).unwrap();
        let got: Vec<u8> = builder.into();
        assert_eq!(got, data);
    }

    #[test]
    fn truncated_read_fails() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let err = VecBuilder::<u8>::new(10).read_exact(&mut cursor).unwrap_err();
        assert!(matches!(err, ReadError::IO(_)));
    }
}
