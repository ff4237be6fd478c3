//! The message envelope shared by every family.
//!
//! A [`Message`] is an optional [`Prefix`] plus a [`Body`]: a command, a
//! numeric reply addressed to a target, or a CTCP payload addressed to a
//! target. Parsing goes through the [`Dispatcher`](crate::Dispatcher);
//! formatting is [`Display`](fmt::Display).
//!
//! # Example
//!
//! ```
//! use nebo_irc::Message;
//!
//! let msg: Message = ":nick!user@host PRIVMSG #channel :Hello".parse().unwrap();
//! assert_eq!(msg.keyword(), "PRIVMSG");
//! assert_eq!(msg.to_string(), ":nick!user@host PRIVMSG #channel :Hello");
//! ```

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::str::FromStr;

use crate::command::{self, Command, CommandConduit};
use crate::ctcp::{Ctcp, CtcpConduit, CtcpMessage};
use crate::dispatch::Dispatcher;
use crate::error::ProtocolError;
use crate::isupport::ServerSupport;
use crate::prefix::Prefix;
use crate::response::{NumericConduit, Reply};
use crate::util::{check_line_length, MAX_LINE_LENGTH};
use crate::validation::ValidationError;

pub(crate) mod args;
mod nom_parser;
mod writer;

pub(crate) use self::nom_parser::CTCP_DELIM;
pub use self::nom_parser::{CtcpFrame, DetailedParseError, RawLine};
pub use self::writer::MessageWriter;

/// Receives typed callbacks for every message family.
///
/// Implement whichever of [`CommandConduit`], [`NumericConduit`] and
/// [`CtcpConduit`] you need (all methods default to no-ops); the union comes
/// for free.
pub trait Conduit: CommandConduit + NumericConduit + CtcpConduit {}

impl<T: CommandConduit + NumericConduit + CtcpConduit + ?Sized> Conduit for T {}

/// A numeric reply and the client it was addressed to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Numeric {
    /// Usually our nickname, or `*` before registration completes.
    pub target: String,
    pub reply: Reply,
}

/// What a message carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    Command(Command),
    Numeric(Numeric),
    Ctcp(CtcpMessage),
}

impl From<Numeric> for Body {
    fn from(numeric: Numeric) -> Self {
        Body::Numeric(numeric)
    }
}

impl From<CtcpMessage> for Body {
    fn from(ctcp: CtcpMessage) -> Self {
        Body::Ctcp(ctcp)
    }
}

impl Body {
    /// The wire keyword: the command, the zero-padded code, or the CTCP
    /// envelope command.
    pub fn keyword(&self) -> Cow<'_, str> {
        match self {
            Body::Command(command) => Cow::Borrowed(command.keyword()),
            Body::Numeric(numeric) => Cow::Owned(format!("{:03}", numeric.reply.code())),
            Body::Ctcp(ctcp) => Cow::Borrowed(ctcp.ctcp.kind().keyword()),
        }
    }

    pub fn write_params(&self, w: &mut MessageWriter) {
        match self {
            Body::Command(command) => command.write_params(w),
            Body::Numeric(numeric) => {
                if !numeric.target.is_empty() {
                    w.param(numeric.target.as_str());
                }
                numeric.reply.write_params(w);
            }
            Body::Ctcp(ctcp) => {
                w.param(ctcp.target.as_str()).trailing(ctcp.ctcp.to_text());
            }
        }
    }
}

/// One IRC message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub prefix: Option<Prefix>,
    pub body: Body,
}

impl Message {
    /// A message without a prefix, as clients send them.
    pub fn new(body: impl Into<Body>) -> Message {
        Message {
            prefix: None,
            body: body.into(),
        }
    }

    pub fn with_prefix(mut self, prefix: Prefix) -> Message {
        self.prefix = Some(prefix);
        self
    }

    pub fn keyword(&self) -> Cow<'_, str> {
        self.body.keyword()
    }

    /// The wire form without the line terminator.
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// Check the message against the server's advertised limits and the
    /// wire line ceiling.
    pub fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        match &self.body {
            Body::Command(command) => command.validate(support)?,
            Body::Numeric(_) => {}
            Body::Ctcp(ctcp) => ctcp.validate(support)?,
        }
        match check_line_length(&self.format()) {
            Some(actual) => Err(ValidationError::TooLong {
                max: MAX_LINE_LENGTH,
                actual,
            }),
            None => Ok(()),
        }
    }

    /// Hand the typed payload to its callback on `conduit`.
    pub fn notify(&self, conduit: &mut dyn Conduit) {
        match &self.body {
            Body::Command(command) => command.notify(self, conduit),
            Body::Numeric(numeric) => numeric.reply.notify(self, conduit),
            Body::Ctcp(ctcp) => ctcp.ctcp.notify(self, conduit),
        }
    }

    /// The nickname of a user prefix.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    pub fn as_command(&self) -> Option<&Command> {
        match &self.body {
            Body::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn as_numeric(&self) -> Option<&Numeric> {
        match &self.body {
            Body::Numeric(numeric) => Some(numeric),
            _ => None,
        }
    }

    pub fn as_reply(&self) -> Option<&Reply> {
        self.as_numeric().map(|n| &n.reply)
    }

    pub fn as_ctcp(&self) -> Option<&CtcpMessage> {
        match &self.body {
            Body::Ctcp(ctcp) => Some(ctcp),
            _ => None,
        }
    }

    // Constructors for the messages clients send most.

    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Message {
        Message::new(command::Privmsg::new(target, text))
    }

    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Message {
        Message::new(command::Notice::new(target, text))
    }

    pub fn join(channel: impl Into<String>) -> Message {
        Message::new(command::Join::new(channel))
    }

    pub fn part(channel: impl Into<String>, reason: Option<&str>) -> Message {
        Message::new(command::Part {
            channels: vec![channel.into()],
            message: reason.map(str::to_string),
        })
    }

    pub fn nick(nickname: impl Into<String>) -> Message {
        Message::new(command::Nick::new(nickname))
    }

    pub fn quit(reason: Option<&str>) -> Message {
        Message::new(command::Quit {
            message: reason.map(str::to_string),
        })
    }

    pub fn ping(token: impl Into<String>) -> Message {
        Message::new(command::Ping::new(token))
    }

    pub fn pong(token: impl Into<String>) -> Message {
        Message::new(command::Pong {
            server: token.into(),
            token: None,
        })
    }

    pub fn numeric(target: impl Into<String>, reply: impl Into<Reply>) -> Message {
        Message::new(Numeric {
            target: target.into(),
            reply: reply.into(),
        })
    }

    /// A CTCP request; the payload must be a request type.
    pub fn ctcp_request(target: impl Into<String>, payload: impl Into<Ctcp>) -> Message {
        Message::new(CtcpMessage::new(target, payload))
    }

    /// A CTCP reply; the payload must be a reply type.
    pub fn ctcp_reply(target: impl Into<String>, payload: impl Into<Ctcp>) -> Message {
        Message::new(CtcpMessage::new(target, payload))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            f.write_char(':')?;
            write!(f, "{}", prefix)?;
            f.write_char(' ')?;
        }
        f.write_str(&self.keyword())?;
        let mut w = MessageWriter::new();
        self.body.write_params(&mut w);
        w.write_to(f)
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    /// Parse with a freshly constructed [`Dispatcher`]. Reuse one dispatcher
    /// when parsing a stream.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dispatcher::new().parse(s)
    }
}
