//! One-shot TCP transport for protocol exchanges.
//!
//! A connection is single-use: one operation equals one
//! connect/write/read/close cycle, with no pooling or reuse. The
//! response read is bounded; a timeout is reported distinctly from a
//! refused connection or a malformed status byte so the shell can raise
//! its modal timeout notice, even though all of them collapse to the
//! same outcome category at the engine layer.

use std::time::Duration;

use bytes::Bytes;
use courier_proto::StatusCode;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::endpoint::ConnectionEndpoint;

/// Bound on the wait for the single response byte.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);

/// Transport timing configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Bound on the wait for the response byte.
    pub response_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { connect_timeout: Duration::from_secs(3), response_timeout: RESPONSE_TIMEOUT }
    }
}

/// Transport failures for one exchange cycle.
///
/// Only [`TransportError::Timeout`] triggers the shell's modal notice;
/// [`TransportError::is_timeout`] is the query the engine uses.
#[derive(Error, Debug)]
pub enum TransportError {
    /// TCP connection could not be established.
    #[error("connection failed: {0}")]
    Connect(std::io::Error),

    /// Connection attempt did not complete within the bound.
    #[error("connect timed out after {elapsed:?}")]
    ConnectTimeout {
        /// How long we waited.
        elapsed: Duration,
    },

    /// Read or write on the established connection failed.
    #[error("stream error: {0}")]
    Io(std::io::Error),

    /// No response byte arrived within the bound.
    #[error("no response within {elapsed:?}")]
    Timeout {
        /// How long we waited.
        elapsed: Duration,
    },

    /// Server closed the connection before sending a status byte.
    #[error("connection closed before a status byte arrived")]
    ConnectionClosed,

    /// Response byte was not a status digit.
    #[error("protocol error: {0}")]
    Protocol(#[from] courier_proto::ProtocolError),
}

impl TransportError {
    /// True for the expired response wait, the one case the shell
    /// notifies about with a modal notice.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Run one request/response cycle against the server.
///
/// Opens a fresh connection, writes every field in order, reads at most
/// one status byte within the configured bound, and decodes it. The
/// socket is owned by this function's scope and is released on every
/// exit path, the timeout path included.
pub async fn exchange(
    endpoint: &ConnectionEndpoint,
    fields: &[Bytes],
    config: &TransportConfig,
) -> Result<StatusCode, TransportError> {
    let addr = endpoint.server_addr();
    debug!(%addr, fields = fields.len(), "opening exchange");

    let mut stream = match timeout(config.connect_timeout, TcpStream::connect(&addr)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => return Err(TransportError::Connect(err)),
        Err(_) => return Err(TransportError::ConnectTimeout { elapsed: config.connect_timeout }),
    };

    for field in fields {
        stream.write_all(field).await.map_err(TransportError::Io)?;
    }

    let mut byte = [0u8; 1];
    let read = timeout(config.response_timeout, stream.read(&mut byte)).await;

    // `stream` drops here on every path, closing the connection.
    match read {
        Ok(Ok(0)) => Err(TransportError::ConnectionClosed),
        Ok(Ok(_)) => {
            trace!(byte = byte[0], "response byte received");
            Ok(StatusCode::from_wire(byte[0])?)
        },
        Ok(Err(err)) => Err(TransportError::Io(err)),
        Err(_) => Err(TransportError::Timeout { elapsed: config.response_timeout }),
    }
}
