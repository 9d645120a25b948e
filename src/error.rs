//! Error types, one small `thiserror` enum per boundary rather than a single
//! crate-wide catch-all, mirroring how the codec layer already separates
//! [`crate::protocol::traits::ReadError`] from
//! [`crate::protocol::traits::WriteError`].

use thiserror::Error;

use crate::protocol::traits::{ReadError, WriteError};
use crate::record::Record;

/// Failures that can occur while decoding or interpreting protocol
/// responses, or while talking to the cluster's topology.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("corrupt response: {0}")]
    Corrupt(String),

    #[error("truncated response")]
    Truncated,

    #[error("failed to encode request: {0}")]
    Encode(#[from] WriteError),

    #[error("no complete record fits in the message set")]
    MessageTooLargeToRead,

    #[error("leader not available")]
    LeaderNotAvailable,

    #[error("not leader for partition")]
    NotLeaderForPartition,

    #[error("request timed out")]
    RequestTimedOut,

    #[error("replica not available")]
    ReplicaNotAvailable,

    #[error("message size too large")]
    MessageSizeTooLarge,

    #[error("invalid topic")]
    InvalidTopic,

    #[error("record list too large")]
    RecordListTooLarge,

    #[error("not enough replicas")]
    NotEnoughReplicas,

    #[error("not enough replicas after append")]
    NotEnoughReplicasAfterAppend,

    #[error("unknown topic or partition")]
    UnknownTopicOrPartition,

    #[error("unknown broker error code {0}")]
    UnknownError(i16),

    #[error("invalid seed broker uri `{uri}`: invalid protocol `{scheme}`")]
    InvalidUri { uri: String, scheme: String },

    /// A delivery loop terminal outcome that isn't a single protocol error
    /// code, e.g. "failed to assign partitions" after the pending queue
    /// never drained.
    #[error("{0}")]
    DeliveryIncomplete(String),
}

impl From<ReadError> for Error {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::IO(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Error::Truncated,
            ReadError::IO(e) => Error::Connection(e),
            ReadError::Overflow(e) => Error::Corrupt(e.to_string()),
            ReadError::Malformed(e) => Error::Corrupt(e.to_string()),
        }
    }
}

/// Errors the [`crate::producer::Producer`] facade may surface to callers.
///
/// This is intentionally the only error type a `Producer` user should ever
/// need to match on; everything recoverable (per-partition failures, stale
/// topology) is handled internally and only escalates here once a whole
/// delivery attempt has exhausted its retries.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("buffer overflow: producing this record would exceed the configured buffer limits")]
    BufferOverflow,

    #[error("failed to deliver {} record(s): {cause}", undelivered.len())]
    DeliveryFailed { cause: Error, undelivered: Vec<Record> },
}
