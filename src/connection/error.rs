//! Connection error types.

use thiserror::Error;

use crate::error::ProtocolError;

/// Errors returned by [`Connection`](super::Connection) operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectionError {
    /// Settings may only change while disconnected, and only one connect
    /// attempt may run at a time.
    #[error("connection is busy")]
    Busy,

    /// A write was attempted without a live connection.
    #[error("not connected")]
    NotConnected,

    /// The encoded line plus CRLF exceeds the wire ceiling. Nothing was
    /// written.
    #[error("line too long: {length} bytes (limit {limit})")]
    Oversize {
        /// Encoded length including the terminator.
        length: usize,
        /// The ceiling.
        limit: usize,
    },

    /// No character encoding is known by this label.
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),

    /// The host name is not usable for TLS server name indication.
    #[error("invalid server name: {0}")]
    InvalidServerName(String),

    /// TLS handshake or certificate verification failed.
    #[error("tls error: {0}")]
    Tls(#[source] std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The outgoing text is not a valid protocol line.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
