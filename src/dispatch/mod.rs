//! Turning raw lines into typed messages.
//!
//! A [`Dispatcher`] holds one candidate list per family, seeded from the
//! static registries, plus a list of custom types that is consulted before
//! anything else. Candidates are tried in order; the first whose
//! `can_parse` accepts the line is moved to the front of its list, so
//! frequent traffic is recognised after few comparisons. Lines nothing
//! claims land in the family's generic fallback.

use std::ops::Deref;

use tracing::trace;

use crate::command::{RawCommand, COMMAND_TYPES};
use crate::ctcp::{unquote, Ctcp, CtcpKind, CtcpMessage, GenericCtcp, CTCP_TYPES};
use crate::error::{MessageParseError, ProtocolError};
use crate::message::{Body, Message, Numeric, RawLine};
use crate::response::{GenericNumeric, NUMERIC_TYPES};
use crate::util::MAX_PARSE_LENGTH;

mod types;

pub use self::types::{CommandType, CtcpType, MessageType, NumericType};

/// Which candidate list to inspect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    Custom,
    Command,
    Numeric,
    Ctcp,
}

/// Parses lines into [`Message`]s. Not thread-safe; give each connection
/// its own.
pub struct Dispatcher {
    custom: Vec<Box<dyn MessageType>>,
    commands: Vec<&'static dyn MessageType>,
    numerics: Vec<&'static dyn MessageType>,
    ctcps: Vec<&'static dyn MessageType>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("custom", &self.custom.len())
            .field("commands", &self.commands.len())
            .field("numerics", &self.numerics.len())
            .field("ctcps", &self.ctcps.len())
            .finish()
    }
}

impl Dispatcher {
    /// A dispatcher knowing every built-in type.
    pub fn new() -> Self {
        Dispatcher {
            custom: Vec::new(),
            commands: COMMAND_TYPES.to_vec(),
            numerics: NUMERIC_TYPES.to_vec(),
            ctcps: CTCP_TYPES.to_vec(),
        }
    }

    /// Add a type that is tried before every built-in one.
    pub fn register(&mut self, message_type: Box<dyn MessageType>) {
        self.custom.push(message_type);
    }

    /// Current candidate names, front first.
    pub fn candidate_order(&self, kind: CandidateKind) -> Vec<&'static str> {
        match kind {
            CandidateKind::Custom => self.custom.iter().map(|t| t.name()).collect(),
            CandidateKind::Command => self.commands.iter().map(|t| t.name()).collect(),
            CandidateKind::Numeric => self.numerics.iter().map(|t| t.name()).collect(),
            CandidateKind::Ctcp => self.ctcps.iter().map(|t| t.name()).collect(),
        }
    }

    /// Parse one line. A trailing CR/LF is ignored.
    ///
    /// Every failure is an [`ProtocolError::InvalidMessage`] carrying the
    /// input line.
    pub fn parse(&mut self, line: &str) -> Result<Message, ProtocolError> {
        self.parse_line(line)
            .map_err(|cause| ProtocolError::invalid_message(line, cause))
    }

    fn parse_line(&mut self, line: &str) -> Result<Message, MessageParseError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }
        let length = trimmed.chars().count();
        if length > MAX_PARSE_LENGTH {
            return Err(MessageParseError::LineTooLong {
                length,
                limit: MAX_PARSE_LENGTH,
            });
        }

        let raw = RawLine::parse(trimmed)?;

        if let Some(message) = try_candidates(&mut self.custom, &raw)? {
            return Ok(message);
        }

        if let Some(code) = raw.numeric_code() {
            return match try_candidates(&mut self.numerics, &raw)? {
                Some(message) => Ok(message),
                None => generic_numeric(code, &raw),
            };
        }

        if let Some(frame) = raw.ctcp() {
            return match try_candidates(&mut self.ctcps, &raw)? {
                Some(message) => Ok(message),
                None => {
                    let generic = GenericCtcp::new(frame.command, frame.data.map(unquote));
                    let ctcp = match frame.kind {
                        CtcpKind::Request => Ctcp::GenericRequest(generic),
                        CtcpKind::Reply => Ctcp::GenericReply(generic),
                    };
                    Ok(Message {
                        prefix: raw.sender()?,
                        body: Body::Ctcp(CtcpMessage {
                            target: frame.target.to_string(),
                            ctcp,
                        }),
                    })
                }
            };
        }

        match try_candidates(&mut self.commands, &raw)? {
            Some(message) => Ok(message),
            None => {
                trace!(command = raw.command, "no command type matched, keeping raw");
                Ok(Message {
                    prefix: raw.sender()?,
                    body: Body::Command(RawCommand::from_line(&raw).into()),
                })
            }
        }
    }
}

/// Try each candidate in order; move the first match to the front and let
/// it parse. A match that fails to parse is an error, not a fall-through.
fn try_candidates<T>(candidates: &mut [T], raw: &RawLine<'_>) -> Result<Option<Message>, MessageParseError>
where
    T: Deref<Target = dyn MessageType>,
{
    let Some(index) = candidates.iter().position(|c| c.can_parse(raw)) else {
        return Ok(None);
    };
    candidates[..=index].rotate_right(1);
    candidates[0].parse(raw).map(Some)
}

fn generic_numeric(code: u16, raw: &RawLine<'_>) -> Result<Message, MessageParseError> {
    let (target, params) = match raw.params.split_first() {
        Some((target, rest)) => (target.to_string(), rest),
        None => (String::new(), &[][..]),
    };
    let reply = GenericNumeric {
        code,
        params: params.iter().map(|s| s.to_string()).collect(),
        trailing: raw.trailing && !params.is_empty(),
    }
    .into_reply();
    Ok(Message {
        prefix: raw.sender()?,
        body: Body::Numeric(Numeric { target, reply }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::response::Reply;

    #[test]
    fn matched_candidate_moves_to_front() {
        let mut dispatcher = Dispatcher::new();
        assert_ne!(dispatcher.candidate_order(CandidateKind::Command)[0], "Kill");
        dispatcher.parse("KILL bob :spam").unwrap();
        let order = dispatcher.candidate_order(CandidateKind::Command);
        assert_eq!(order[0], "Kill");
        assert_eq!(order.len(), COMMAND_TYPES.len());
    }

    #[test]
    fn empty_and_long_lines_rejected() {
        let mut dispatcher = Dispatcher::new();
        let err = dispatcher.parse("\r\n").unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidMessage {
                cause: MessageParseError::EmptyMessage,
                ..
            }
        ));
        let long = format!("PRIVMSG #a :{}", "x".repeat(600));
        assert!(dispatcher.parse(&long).is_err());
    }

    #[test]
    fn unknown_command_kept_raw() {
        let mut dispatcher = Dispatcher::new();
        let msg = dispatcher.parse("FROB a b :c d").unwrap();
        match msg.as_command() {
            Some(Command::Raw(raw)) => {
                assert_eq!(raw.keyword, "FROB");
                assert_eq!(raw.params, vec!["a", "b", "c d"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(msg.to_string(), "FROB a b :c d");
    }

    #[test]
    fn unknown_numerics_split_by_class() {
        let mut dispatcher = Dispatcher::new();
        let ok = dispatcher.parse(":irc.x 265 me 4 9 :Current local users").unwrap();
        assert!(matches!(ok.as_reply(), Some(Reply::GenericReply(_))));
        let err = dispatcher.parse(":irc.x 490 me :nope").unwrap();
        assert!(matches!(err.as_reply(), Some(Reply::GenericError(_))));
        assert_eq!(err.to_string(), ":irc.x 490 me :nope");
    }

    #[test]
    fn unknown_ctcp_is_generic() {
        let mut dispatcher = Dispatcher::new();
        let msg = dispatcher.parse(":a!b@c PRIVMSG bob :\x01FOO bar\x01").unwrap();
        let ctcp = msg.as_ctcp().unwrap();
        assert_eq!(
            ctcp.ctcp,
            Ctcp::GenericRequest(GenericCtcp::new("FOO", Some("bar".into())))
        );
    }

    #[test]
    fn parse_error_is_not_a_fallback() {
        let mut dispatcher = Dispatcher::new();
        // KICK needs a channel and a user.
        assert!(dispatcher.parse("KICK #rust").is_err());
    }

    #[test]
    fn bad_prefix_is_a_parse_failure() {
        let mut dispatcher = Dispatcher::new();
        assert!(dispatcher.parse(":!user@host PRIVMSG #a :hi").is_err());
    }
}
