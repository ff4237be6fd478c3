//! # nebo-irc
//!
//! An IRC client protocol engine: typed messages, a self-tuning line
//! dispatcher, a mode codec driven by server capabilities, an async
//! connection and contact presence tracking.
//!
//! ## Features
//!
//! - Three message families (commands, numeric replies and CTCP), each a
//!   closed enum with a conduit trait of per-type callbacks
//! - A [`Dispatcher`] that moves frequently seen types to the front of its
//!   candidate lists and falls back to generic types for anything unknown
//! - RPL_ISUPPORT parsing into a [`ServerSupport`] that drives mode parsing
//!   and validation
//! - Optional Tokio [`connection`] with TLS, keep-alive and line framing
//! - [`presence`] tracking over WATCH, MONITOR or ISON polling

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Creating messages
//!
//! ```rust
//! use nebo_irc::{Message, Prefix};
//!
//! let privmsg = Message::privmsg("#rust", "Hello, world!");
//! assert_eq!(privmsg.to_string(), "PRIVMSG #rust :Hello, world!");
//!
//! let relayed = Message::notice("nick", "Server notice")
//!     .with_prefix(Prefix::ServerName("irc.example.net".into()));
//! assert_eq!(relayed.to_string(), ":irc.example.net NOTICE nick :Server notice");
//! ```
//!
//! ### Parsing a stream
//!
//! ```rust
//! use nebo_irc::{Dispatcher, Reply};
//!
//! let mut dispatcher = Dispatcher::new();
//! let msg = dispatcher.parse(":irc.example.net 001 me :Welcome to IRC").unwrap();
//! assert!(matches!(msg.as_reply(), Some(Reply::Welcome(_))));
//! ```
//!
//! ### Modes
//!
//! ```rust
//! use nebo_irc::{parse_channel_modes, ChannelMode, Mode, ServerSupport};
//!
//! let support = ServerSupport::default();
//! let modes = parse_channel_modes("+ov-k", &["alice", "bob", "secret"], &support).unwrap();
//! assert_eq!(modes[0], Mode::plus(ChannelMode::Oper, Some("alice")));
//! ```

pub mod casemap;
pub mod command;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod connection;
pub mod ctcp;
pub mod dispatch;
pub mod error;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod presence;
pub mod response;
pub mod util;
pub mod validation;

pub use self::casemap::{irc_eq, irc_to_lower, CaseMapping};
pub use self::command::{Command, CommandConduit, RawCommand};
pub use self::ctcp::{Ctcp, CtcpConduit, CtcpKind, CtcpMessage};
pub use self::dispatch::{CandidateKind, Dispatcher, MessageType};
pub use self::error::{MessageParseError, ModeParseError, ProtocolError};
pub use self::isupport::{Isupport, ServerSupport};
pub use self::message::{Body, Conduit, Message, Numeric};
pub use self::mode::{
    apply_to, parse_channel_modes, parse_user_modes, serialize_modes, ChannelMode, Mode, UserMode,
};
pub use self::prefix::Prefix;
pub use self::presence::{ContactList, PresenceEvent, PresenceStatus};
pub use self::response::{NumericConduit, Reply, Response};
pub use self::validation::ValidationError;

#[cfg(feature = "tokio")]
pub use self::connection::{Connection, ConnectionConfig, ConnectionError, ConnectionEvent};
