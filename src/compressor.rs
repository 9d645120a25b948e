//! Wraps a [`MessageSet`] in a compressed envelope once the batch size
//! passes the configured threshold.

use chrono::Utc;

use crate::compression::{self, Codec};
use crate::error::Error;
use crate::record_batch::{MessageSet, WireRecord, MAGIC_V1};

/// Returns `set` unchanged if `codec` is [`Codec::None`] or the batch is
/// smaller than `threshold`; otherwise returns a new single-record
/// `MessageSet` wrapping the codec-compressed encoding of `set`, offset by
/// `wrapper_offset`.
pub fn compress(
    set: MessageSet,
    codec: Codec,
    threshold: usize,
    wrapper_offset: i64,
) -> Result<MessageSet, Error> {
    if codec == Codec::None || set.0.len() < threshold {
        return Ok(set);
    }

    let inner_encoded = set.encode()?;
    let compressed = compression::compress(codec, &inner_encoded)?;

    Ok(MessageSet(vec![WireRecord {
        offset: wrapper_offset,
        magic: MAGIC_V1,
        codec,
        timestamp: Some(Utc::now().timestamp_millis()),
        key: None,
        value: Some(compressed),
    }]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_batch::WireRecord as Wr;

    fn record(offset: i64, value: &[u8]) -> Wr {
        Wr {
            offset,
            magic: MAGIC_V1,
            codec: Codec::None,
            timestamp: Some(0),
            key: None,
            value: Some(value.to_vec()),
        }
    }

    #[test]
    fn below_threshold_is_left_unchanged() {
        let set = MessageSet(vec![record(0, b"a"), record(1, b"b")]);
        let result = compress(set.clone(), Codec::Gzip, 3, 1000).unwrap();
        assert_eq!(result, set);
    }

    #[test]
    fn none_codec_is_never_wrapped() {
        let set = MessageSet(vec![record(0, b"a"), record(1, b"b"), record(2, b"c")]);
        let result = compress(set.clone(), Codec::None, 1, 1000).unwrap();
        assert_eq!(result, set);
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn at_or_above_threshold_wraps_a_single_record() {
        let set = MessageSet(vec![record(0, b"a"), record(1, b"b"), record(2, b"c")]);
        let result = compress(set, Codec::Gzip, 3, 1000).unwrap();
        assert_eq!(result.0.len(), 1);
        assert_eq!(result.0[0].offset, 1000);
        assert_eq!(result.0[0].codec, Codec::Gzip);
    }
}
