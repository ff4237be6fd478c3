//! Async transport for one server connection.
//!
//! A [`Connection`] moves through [`ConnectionState::Disconnected`],
//! [`ConnectionState::Connecting`] and [`ConnectionState::Connected`].
//! Once connected, a spawned task reads lines, hands them to the
//! connection's [`Dispatcher`] and reports everything on the event channel returned by
//! [`Connection::new`]. Writing happens on the caller's task.
//!
//! ```no_run
//! # async fn run() -> Result<(), nebo_irc::connection::ConnectionError> {
//! use nebo_irc::connection::{Connection, ConnectionConfig, ConnectionEvent};
//! use nebo_irc::Message;
//!
//! let (mut conn, mut events) = Connection::new(ConnectionConfig::new("irc.libera.chat", 6697).tls());
//! conn.connect().await?;
//! conn.send(&Message::nick("nebo")).await?;
//! while let Some(event) = events.recv().await {
//!     if let ConnectionEvent::Message(msg) = event {
//!         println!("{}", msg);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::dispatch::{Dispatcher, MessageType};
use crate::error::ProtocolError;
use crate::message::Message;
use crate::validation::is_protocol_control_char;

mod codec;
mod error;
mod tls;

pub use self::codec::{Inbound, LineCodec};
pub use self::error::ConnectionError;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Lifecycle state of a [`Connection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Endpoint settings. Frozen while a connection is live.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionConfig {
    pub address: String,
    pub port: u16,
    /// WHATWG encoding label, e.g. `utf-8` or `iso-8859-1`.
    pub encoding: String,
    pub use_tls: bool,
    pub keepalive: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            address: String::new(),
            port: 6667,
            encoding: "utf-8".to_string(),
            use_tls: false,
            keepalive: true,
        }
    }
}

impl ConnectionConfig {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        ConnectionConfig {
            address: address.into(),
            port,
            ..Default::default()
        }
    }

    /// Enable TLS.
    pub fn tls(mut self) -> Self {
        self.use_tls = true;
        self
    }
}

/// Why the connection ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed the stream.
    Closed,
    /// A transport error, including failed connect attempts.
    Error(String),
    /// [`Connection::disconnect`] or [`Connection::abort`] was called.
    Cancelled,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::Closed => f.write_str("closed by peer"),
            DisconnectReason::Error(e) => write!(f, "error: {}", e),
            DisconnectReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Notifications delivered on the event channel, in wire order.
#[derive(Debug)]
pub enum ConnectionEvent {
    StateChanged(ConnectionState),
    /// A raw line, trimmed of surrounding whitespace.
    DataReceived(String),
    Message(Message),
    /// A line that could not be parsed. The read loop keeps going.
    ParseFailed(ProtocolError),
    /// A line written successfully, terminator removed.
    DataSent(String),
    Disconnected(DisconnectReason),
}

struct Shared {
    state: Mutex<ConnectionState>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ConnectionEvent) {
        // A dropped receiver only means nobody is listening.
        let _ = self.events.send(event);
    }

    /// Move to `to`, emitting `StateChanged` if that is a change.
    fn transition(&self, to: ConnectionState) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == to {
            return false;
        }
        *state = to;
        self.emit(ConnectionEvent::StateChanged(to));
        true
    }

    fn begin_connect(&self) -> Result<(), ConnectionError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != ConnectionState::Disconnected {
            return Err(ConnectionError::Busy);
        }
        *state = ConnectionState::Connecting;
        self.emit(ConnectionEvent::StateChanged(ConnectionState::Connecting));
        Ok(())
    }

    /// Settle in Disconnected. Only the first caller reports the reason.
    fn finish(&self, reason: DisconnectReason) {
        if self.transition(ConnectionState::Disconnected) {
            self.emit(ConnectionEvent::Disconnected(reason));
        }
    }
}

/// One client connection to an IRC server.
pub struct Connection {
    config: ConnectionConfig,
    shared: Arc<Shared>,
    /// Survives reconnects so custom types and candidate order carry over.
    dispatcher: Arc<Mutex<Dispatcher>>,
    writer: Option<FramedWrite<BoxedWriter, LineCodec>>,
    cancel: CancellationToken,
    reader: Option<JoinHandle<()>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

impl Connection {
    /// Create a disconnected connection and the receiving end of its event
    /// channel.
    pub fn new(config: ConnectionConfig) -> (Connection, mpsc::UnboundedReceiver<ConnectionEvent>) {
        Connection::with_dispatcher(config, Dispatcher::new())
    }

    /// Like [`new`](Self::new), parsing inbound lines with `dispatcher`.
    pub fn with_dispatcher(
        config: ConnectionConfig,
        dispatcher: Dispatcher,
    ) -> (Connection, mpsc::UnboundedReceiver<ConnectionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let conn = Connection {
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(ConnectionState::Disconnected),
                events,
            }),
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            writer: None,
            cancel: CancellationToken::new(),
            reader: None,
        };
        (conn, rx)
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Add a message type to the dispatcher. Takes effect on the next
    /// inbound line, connected or not.
    pub fn register(&self, message_type: Box<dyn MessageType>) {
        self.dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(message_type);
    }

    fn settings(&mut self) -> Result<&mut ConnectionConfig, ConnectionError> {
        if self.state() != ConnectionState::Disconnected {
            return Err(ConnectionError::Busy);
        }
        Ok(&mut self.config)
    }

    pub fn set_address(&mut self, address: impl Into<String>) -> Result<(), ConnectionError> {
        self.settings()?.address = address.into();
        Ok(())
    }

    pub fn set_port(&mut self, port: u16) -> Result<(), ConnectionError> {
        self.settings()?.port = port;
        Ok(())
    }

    /// Set the character encoding by label. Unknown labels are rejected.
    pub fn set_encoding(&mut self, label: &str) -> Result<(), ConnectionError> {
        if LineCodec::for_label(label).is_none() {
            return Err(ConnectionError::UnknownEncoding(label.to_string()));
        }
        self.settings()?.encoding = label.to_string();
        Ok(())
    }

    pub fn set_use_tls(&mut self, use_tls: bool) -> Result<(), ConnectionError> {
        self.settings()?.use_tls = use_tls;
        Ok(())
    }

    pub fn set_keepalive(&mut self, keepalive: bool) -> Result<(), ConnectionError> {
        self.settings()?.keepalive = keepalive;
        Ok(())
    }

    /// Open the transport and start the read task.
    ///
    /// Fails with [`ConnectionError::Busy`] unless disconnected. Any other
    /// failure also ends in `Disconnected(DisconnectReason::Error(..))` on
    /// the event channel.
    pub async fn connect(&mut self) -> Result<(), ConnectionError> {
        self.shared.begin_connect()?;
        self.writer = None;
        self.reader = None;
        self.cancel = CancellationToken::new();

        let (reader, writer, codec) = match self.establish().await {
            Ok(parts) => parts,
            Err(e) => {
                warn!(address = %self.config.address, port = self.config.port, error = %e, "connect failed");
                self.shared.finish(DisconnectReason::Error(e.to_string()));
                return Err(e);
            }
        };

        self.writer = Some(FramedWrite::new(writer, codec.clone()));
        self.shared.transition(ConnectionState::Connected);
        debug!(address = %self.config.address, port = self.config.port, "connected");

        let lines = FramedRead::new(reader, codec);
        self.reader = Some(tokio::spawn(read_loop(
            lines,
            Arc::clone(&self.shared),
            Arc::clone(&self.dispatcher),
            self.cancel.clone(),
        )));
        Ok(())
    }

    async fn establish(&self) -> Result<(BoxedReader, BoxedWriter, LineCodec), ConnectionError> {
        let config = &self.config;
        let codec = LineCodec::for_label(&config.encoding)
            .ok_or_else(|| ConnectionError::UnknownEncoding(config.encoding.clone()))?;

        debug!(address = %config.address, port = config.port, tls = config.use_tls, "connecting");
        let stream = TcpStream::connect((config.address.as_str(), config.port)).await?;
        if config.keepalive {
            if let Err(e) = enable_keepalive(&stream) {
                warn!("failed to enable TCP keepalive: {}", e);
            }
        }

        if config.use_tls {
            let stream = tls::handshake(&config.address, stream).await?;
            let (reader, writer) = tokio::io::split(stream);
            Ok((Box::new(reader), Box::new(writer), codec))
        } else {
            let (reader, writer) = stream.into_split();
            Ok((Box::new(reader), Box::new(writer), codec))
        }
    }

    /// Write one line. A trailing CRLF or LF is accepted and normalised.
    ///
    /// Lines whose encoded form plus CRLF exceeds 512 bytes fail with
    /// [`ConnectionError::Oversize`] before anything is written; they are
    /// never split.
    pub async fn write(&mut self, text: &str) -> Result<(), ConnectionError> {
        let line = match text.strip_suffix('\n') {
            Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
            None => text,
        };
        if let Some(c) = line.chars().find(|c| is_protocol_control_char(*c)) {
            return Err(ProtocolError::IllegalControlChar(c).into());
        }
        if self.state() != ConnectionState::Connected {
            return Err(ConnectionError::NotConnected);
        }
        let writer = self.writer.as_mut().ok_or(ConnectionError::NotConnected)?;
        writer.send(line.to_string()).await?;
        trace!(line, "sent");
        self.shared.emit(ConnectionEvent::DataSent(line.to_string()));
        Ok(())
    }

    /// Format and write a message.
    pub async fn send(&mut self, message: &Message) -> Result<(), ConnectionError> {
        self.write(&message.to_string()).await
    }

    /// Stop the read task cooperatively, then close the write half.
    pub async fn disconnect(&mut self) {
        self.cancel.cancel();
        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.await {
                debug!(error = %e, "read task ended abnormally");
            }
        }
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.close().await {
                debug!(error = %e, "closing write half failed");
            }
        }
        self.shared.finish(DisconnectReason::Cancelled);
    }

    /// Abort the read task without waiting for it.
    pub fn abort(&mut self) {
        self.cancel.cancel();
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        self.writer = None;
        self.shared.finish(DisconnectReason::Cancelled);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
    let sock = SockRef::from(stream);
    let keepalive = TcpKeepalive::new()
        .with_time(Duration::from_secs(120))
        .with_interval(Duration::from_secs(30));
    sock.set_tcp_keepalive(&keepalive)
}

async fn read_loop(
    mut lines: FramedRead<BoxedReader, LineCodec>,
    shared: Arc<Shared>,
    dispatcher: Arc<Mutex<Dispatcher>>,
    cancel: CancellationToken,
) {
    let reason = loop {
        let frame = tokio::select! {
            biased;
            _ = cancel.cancelled() => break DisconnectReason::Cancelled,
            frame = lines.next() => frame,
        };
        match frame {
            Some(Ok(Inbound::Line(line))) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                trace!(line, "received");
                shared.emit(ConnectionEvent::DataReceived(line.to_string()));
                let parsed = dispatcher
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .parse(line);
                match parsed {
                    Ok(message) => shared.emit(ConnectionEvent::Message(message)),
                    Err(e) => {
                        warn!(error = %e, "failed to parse line");
                        shared.emit(ConnectionEvent::ParseFailed(e));
                    }
                }
            }
            Some(Ok(Inbound::Oversize(length))) => {
                warn!(length, "skipping overlong line");
                shared.emit(ConnectionEvent::ParseFailed(ProtocolError::MessageTooLong(length)));
            }
            Some(Err(e)) => break DisconnectReason::Error(e.to_string()),
            None => break DisconnectReason::Closed,
        }
    };
    debug!(reason = %reason, "read loop finished");
    shared.finish(reason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_frozen_while_busy() {
        let (mut conn, _rx) = Connection::new(ConnectionConfig::new("localhost", 6667));
        conn.set_port(6697).unwrap();
        assert!(matches!(
            conn.set_encoding("klingon"),
            Err(ConnectionError::UnknownEncoding(_))
        ));
        conn.shared.begin_connect().unwrap();
        assert!(matches!(conn.set_port(1), Err(ConnectionError::Busy)));
        assert!(matches!(conn.set_use_tls(true), Err(ConnectionError::Busy)));
        assert_eq!(conn.config().port, 6697);
    }

    #[test]
    fn finish_reports_once() {
        let (conn, mut rx) = Connection::new(ConnectionConfig::default());
        conn.shared.begin_connect().unwrap();
        conn.shared.finish(DisconnectReason::Closed);
        conn.shared.finish(DisconnectReason::Cancelled);
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 3);
        assert!(matches!(
            events[2],
            ConnectionEvent::Disconnected(DisconnectReason::Closed)
        ));
    }

    #[tokio::test]
    async fn write_requires_connection() {
        let (mut conn, _rx) = Connection::new(ConnectionConfig::default());
        assert!(matches!(
            conn.write("PING :x").await,
            Err(ConnectionError::NotConnected)
        ));
        assert!(matches!(
            conn.write("PING :x\r\nQUIT").await,
            Err(ConnectionError::Protocol(ProtocolError::IllegalControlChar('\r')))
        ));
    }
}
