//! Client-to-client protocol.
//!
//! A CTCP message is a PRIVMSG (request) or NOTICE (reply) whose text is
//! wrapped in `\x01`. The first word is the inner command; the rest is data,
//! low-level quoted so it never carries CR, LF, NUL or a bare `\x01`.
//!
//! Each inner command has a type implementing [`CtcpPayload`]. [`Ctcp`],
//! [`CtcpConduit`] and [`CTCP_TYPES`] are generated from one list.

use std::fmt;
use std::marker::PhantomData;

use crate::dispatch::{CtcpType, MessageType};
use crate::error::MessageParseError;
use crate::isupport::ServerSupport;
use crate::message::{Conduit, Message, CTCP_DELIM};
use crate::validation::ValidationError;

mod types;

pub use self::types::{
    Action, ClientInfo, ClientInfoReply, Dcc, ErrMsg, ErrMsgReply, Finger, FingerReply, Page,
    Ping, PingReply, Source, SourceReply, Time, TimeReply, UserInfo, UserInfoReply, Version,
    VersionReply,
};

/// Direction of a CTCP message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CtcpKind {
    /// Carried by PRIVMSG.
    Request,
    /// Carried by NOTICE.
    Reply,
}

impl CtcpKind {
    /// The envelope command.
    pub fn keyword(self) -> &'static str {
        match self {
            CtcpKind::Request => "PRIVMSG",
            CtcpKind::Reply => "NOTICE",
        }
    }
}

/// An inner CTCP command.
///
/// `parse` receives the data with quoting already undone; `data` returns it
/// unquoted as well.
pub trait CtcpPayload: Sized + Clone + fmt::Debug + PartialEq + Into<Ctcp> {
    const COMMAND: &'static str;
    const KIND: CtcpKind;

    fn parse(data: Option<&str>) -> Result<Self, MessageParseError>;

    fn data(&self) -> Option<String>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Apply low-level quoting to CTCP data.
pub fn quote(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    for c in data.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            CTCP_DELIM => out.push_str("\\a"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

/// Undo [`quote`]. An unknown escape yields the escaped character and a
/// lone trailing backslash is dropped.
pub fn unquote(data: &str) -> String {
    let mut out = String::with_capacity(data.len());
    let mut chars = data.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('a') => out.push(CTCP_DELIM),
            Some('0') => out.push('\0'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// A CTCP command no registered type claimed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericCtcp {
    /// Inner command, as received.
    pub command: String,
    pub data: Option<String>,
}

impl GenericCtcp {
    pub fn new(command: impl Into<String>, data: Option<String>) -> Self {
        GenericCtcp {
            command: command.into(),
            data,
        }
    }
}

macro_rules! ctcp_family {
    ($( $variant:ident($ty:ident) => $callback:ident, )*) => {
        /// Every CTCP payload.
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum Ctcp {
            $( $variant($ty), )*
            /// An unrecognised request.
            GenericRequest(GenericCtcp),
            /// An unrecognised reply.
            GenericReply(GenericCtcp),
        }

        $(
            impl From<$ty> for Ctcp {
                fn from(payload: $ty) -> Self {
                    Ctcp::$variant(payload)
                }
            }
        )*

        impl Ctcp {
            /// The inner command.
            pub fn command(&self) -> &str {
                match self {
                    $( Ctcp::$variant(_) => <$ty as CtcpPayload>::COMMAND, )*
                    Ctcp::GenericRequest(g) | Ctcp::GenericReply(g) => &g.command,
                }
            }

            pub fn kind(&self) -> CtcpKind {
                match self {
                    $( Ctcp::$variant(_) => <$ty as CtcpPayload>::KIND, )*
                    Ctcp::GenericRequest(_) => CtcpKind::Request,
                    Ctcp::GenericReply(_) => CtcpKind::Reply,
                }
            }

            /// Unquoted data after the command.
            pub fn data(&self) -> Option<String> {
                match self {
                    $( Ctcp::$variant(p) => p.data(), )*
                    Ctcp::GenericRequest(g) | Ctcp::GenericReply(g) => g.data.clone(),
                }
            }

            fn validate_payload(&self) -> Result<(), ValidationError> {
                match self {
                    $( Ctcp::$variant(p) => p.validate(), )*
                    Ctcp::GenericRequest(g) | Ctcp::GenericReply(g) => {
                        if g.command.is_empty() {
                            return Err(ValidationError::Empty);
                        }
                        match g.command.char_indices().find(|(_, c)| *c == ' ' || c.is_control()) {
                            Some((position, ch)) => Err(ValidationError::InvalidChar { ch, position }),
                            None => Ok(()),
                        }
                    }
                }
            }

            pub(crate) fn notify(&self, message: &Message, conduit: &mut dyn Conduit) {
                match self {
                    $( Ctcp::$variant(p) => conduit.$callback(message, p), )*
                    Ctcp::GenericRequest(g) => conduit.on_generic_ctcp_request(message, g),
                    Ctcp::GenericReply(g) => conduit.on_generic_ctcp_reply(message, g),
                }
            }
        }

        /// Callbacks for CTCP payloads. Every method defaults to a no-op.
        #[allow(unused_variables)]
        pub trait CtcpConduit {
            $( fn $callback(&mut self, message: &Message, payload: &$ty) {} )*
            fn on_generic_ctcp_request(&mut self, message: &Message, payload: &GenericCtcp) {}
            fn on_generic_ctcp_reply(&mut self, message: &Message, payload: &GenericCtcp) {}
        }

        /// The built-in CTCP types, in initial dispatch order.
        pub static CTCP_TYPES: &[&dyn MessageType] = &[
            $( &CtcpType::<$ty>(PhantomData), )*
        ];
    };
}

ctcp_family! {
    Action(Action) => on_ctcp_action,
    Version(Version) => on_ctcp_version_request,
    VersionReply(VersionReply) => on_ctcp_version_reply,
    Ping(Ping) => on_ctcp_ping_request,
    PingReply(PingReply) => on_ctcp_ping_reply,
    Time(Time) => on_ctcp_time_request,
    TimeReply(TimeReply) => on_ctcp_time_reply,
    ClientInfo(ClientInfo) => on_ctcp_client_info_request,
    ClientInfoReply(ClientInfoReply) => on_ctcp_client_info_reply,
    UserInfo(UserInfo) => on_ctcp_user_info_request,
    UserInfoReply(UserInfoReply) => on_ctcp_user_info_reply,
    Finger(Finger) => on_ctcp_finger_request,
    FingerReply(FingerReply) => on_ctcp_finger_reply,
    Source(Source) => on_ctcp_source_request,
    SourceReply(SourceReply) => on_ctcp_source_reply,
    ErrMsg(ErrMsg) => on_ctcp_errmsg_request,
    ErrMsgReply(ErrMsgReply) => on_ctcp_errmsg_reply,
    Page(Page) => on_ctcp_page,
    Dcc(Dcc) => on_ctcp_dcc,
}

impl Ctcp {
    /// The `\x01`-wrapped text carried by the envelope.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        text.push(CTCP_DELIM);
        text.push_str(self.command());
        if let Some(data) = self.data() {
            text.push(' ');
            text.push_str(&quote(&data));
        }
        text.push(CTCP_DELIM);
        text
    }
}

/// A CTCP payload addressed to a target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtcpMessage {
    pub target: String,
    pub ctcp: Ctcp,
}

impl CtcpMessage {
    pub fn new(target: impl Into<String>, ctcp: impl Into<Ctcp>) -> Self {
        CtcpMessage {
            target: target.into(),
            ctcp: ctcp.into(),
        }
    }

    pub fn validate(&self, _support: &ServerSupport) -> Result<(), ValidationError> {
        if self.target.is_empty() {
            return Err(ValidationError::Empty);
        }
        if let Some((position, ch)) = self
            .target
            .char_indices()
            .find(|(_, c)| *c == ' ' || *c == ',' || c.is_control())
        {
            return Err(ValidationError::InvalidChar { ch, position });
        }
        self.ctcp.validate_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_table() {
        assert_eq!(quote("a\\b"), "a\\\\b");
        assert_eq!(quote("\x01"), "\\a");
        assert_eq!(quote("x\0y\r\n"), "x\\0y\\r\\n");
        assert_eq!(unquote("a\\\\b"), "a\\b");
        assert_eq!(unquote("\\a\\0\\n\\r"), "\x01\0\n\r");
    }

    #[test]
    fn unknown_escape_keeps_char() {
        assert_eq!(unquote("\\q"), "q");
        assert_eq!(unquote("end\\"), "end");
    }

    #[test]
    fn text_wraps_and_quotes() {
        let ctcp: Ctcp = Action {
            text: "waves\nhello".into(),
        }
        .into();
        assert_eq!(ctcp.to_text(), "\x01ACTION waves\\nhello\x01");
        let version: Ctcp = Version.into();
        assert_eq!(version.to_text(), "\x01VERSION\x01");
    }

    #[test]
    fn registry_names_are_unique() {
        let mut names: Vec<&str> = CTCP_TYPES.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CTCP_TYPES.len());
        assert_eq!(CTCP_TYPES.len(), 19);
    }

    #[test]
    fn message_validation() {
        let support = ServerSupport::default();
        assert!(CtcpMessage::new("bob", Version).validate(&support).is_ok());
        assert!(CtcpMessage::new("", Version).validate(&support).is_err());
        let bad = CtcpMessage::new("bob", Ctcp::GenericRequest(GenericCtcp::new("BAD CMD", None)));
        assert!(bad.validate(&support).is_err());
    }
}
