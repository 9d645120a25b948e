//! Constants describing this build, sent to the broker as the request
//! `client_id` when the caller does not supply one of their own.

pub const CLIENT_ID: &str = concat!("logcask-", env!("CARGO_PKG_VERSION"));
