//! A single blocking TCP session to one broker.

use std::io::Cursor;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::api_version::ApiVersion;
use crate::protocol::frame::{read_response, write_request};
use crate::protocol::messages::header::RequestHeader;
use crate::protocol::messages::RequestBody;
use crate::protocol::traits::{ReadError, ReadType, WriteError, WriteType};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        source: std::io::Error,
    },

    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode request: {0}")]
    Encode(#[from] WriteError),

    #[error("failed to decode response: {0}")]
    Decode(#[from] ReadError),

    #[error("correlation id mismatch: expected {expected}, got {got}")]
    CorrelationMismatch { expected: i32, got: i32 },
}

/// One TCP session to one broker, with a monotonically increasing
/// correlation id and a request/response call dispatched by the wire type's
/// [`RequestBody::ResponseBody`].
#[derive(Debug)]
pub struct BrokerConnection {
    host: String,
    port: u16,
    client_id: String,
    next_correlation_id: AtomicI32,
    stream: Mutex<TcpStream>,
}

impl BrokerConnection {
    pub fn connect(
        host: &str,
        port: u16,
        client_id: String,
        socket_timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        let stream = TcpStream::connect((host, port)).map_err(|source| Error::Connect {
            host: host.to_string(),
            port,
            source,
        })?;
        stream.set_read_timeout(socket_timeout)?;
        stream.set_write_timeout(socket_timeout)?;
        stream.set_nodelay(true)?;

        debug!(host, port, "connected to broker");

        Ok(Self {
            host: host.to_string(),
            port,
            client_id,
            next_correlation_id: AtomicI32::new(0),
            stream: Mutex::new(stream),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Writes a framed request and waits for the matching response. A
    /// correlation id mismatch closes the underlying socket: once the
    /// stream desyncs there is no way to recover byte alignment for the
    /// next call.
    pub fn send<B>(&self, body: &B) -> Result<B::ResponseBody, Error>
    where
        B: RequestBody + WriteType<Vec<u8>>,
        B::ResponseBody: ReadType<Cursor<Vec<u8>>>,
    {
        let (correlation_id, mut stream) = self.write_framed(body)?;

        let (got_correlation_id, response) = read_response(&mut *stream)?;
        if got_correlation_id != correlation_id {
            warn!(
                host = %self.host,
                port = self.port,
                expected = correlation_id,
                got = got_correlation_id,
                "correlation id mismatch, closing connection",
            );
            let _ = stream.shutdown(Shutdown::Both);
            return Err(Error::CorrelationMismatch {
                expected: correlation_id,
                got: got_correlation_id,
            });
        }

        Ok(response)
    }

    /// Writes a framed request without waiting for a response, for
    /// `required_acks == 0` produce requests where the broker does not send
    /// one back.
    pub fn send_fire_and_forget<B>(&self, body: &B) -> Result<(), Error>
    where
        B: RequestBody + WriteType<Vec<u8>>,
    {
        self.write_framed(body)?;
        Ok(())
    }

    fn write_framed<B>(&self, body: &B) -> Result<(i32, parking_lot::MutexGuard<'_, TcpStream>), Error>
    where
        B: RequestBody + WriteType<Vec<u8>>,
    {
        let correlation_id = self.next_correlation_id.fetch_add(1, Ordering::Relaxed);
        let header = RequestHeader {
            request_api_key: B::API_KEY,
            request_api_version: ApiVersion(0),
            correlation_id,
            client_id: Some(self.client_id.clone()),
        };

        let mut stream = self.stream.lock();
        write_request(&mut *stream, &header, body)?;
        Ok((correlation_id, stream))
    }
}
