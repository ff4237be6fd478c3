//! The type-erased view of a concrete message type that the dispatcher
//! keeps in its candidate lists.

use std::fmt;
use std::marker::PhantomData;

use crate::command::CommandMessage;
use crate::ctcp::{CtcpPayload, CtcpMessage};
use crate::error::MessageParseError;
use crate::message::{Body, Message, Numeric, RawLine};
use crate::response::NumericMessage;

/// A concrete message type as seen by the [`Dispatcher`](super::Dispatcher).
///
/// Implementations must keep `can_parse` cheap and side-effect free; it runs
/// for every candidate until one matches.
pub trait MessageType: Send + Sync {
    /// A short, stable name for diagnostics and ordering inspection.
    fn name(&self) -> &'static str;

    fn can_parse(&self, line: &RawLine<'_>) -> bool;

    fn parse(&self, line: &RawLine<'_>) -> Result<Message, MessageParseError>;
}

impl fmt::Debug for dyn MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn short_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Registry entry for a command-style type.
pub struct CommandType<T>(pub(crate) PhantomData<fn() -> T>);

impl<T: CommandMessage> MessageType for CommandType<T> {
    fn name(&self) -> &'static str {
        short_name::<T>()
    }

    fn can_parse(&self, line: &RawLine<'_>) -> bool {
        line.command.eq_ignore_ascii_case(T::KEYWORD) && T::accepts(&line.params)
    }

    fn parse(&self, line: &RawLine<'_>) -> Result<Message, MessageParseError> {
        let command = T::parse(&line.params)?;
        Ok(Message {
            prefix: line.sender()?,
            body: Body::Command(command.into()),
        })
    }
}

/// Registry entry for a numeric reply type.
pub struct NumericType<T>(pub(crate) PhantomData<fn() -> T>);

impl<T: NumericMessage> MessageType for NumericType<T> {
    fn name(&self) -> &'static str {
        short_name::<T>()
    }

    fn can_parse(&self, line: &RawLine<'_>) -> bool {
        line.numeric_code() == Some(T::CODE.code()) && !line.params.is_empty()
    }

    fn parse(&self, line: &RawLine<'_>) -> Result<Message, MessageParseError> {
        let (target, rest) = line
            .params
            .split_first()
            .ok_or_else(|| MessageParseError::arity(1, 0))?;
        let reply = T::parse(rest)?;
        Ok(Message {
            prefix: line.sender()?,
            body: Body::Numeric(Numeric {
                target: target.to_string(),
                reply: reply.into(),
            }),
        })
    }
}

/// Registry entry for a CTCP payload type.
pub struct CtcpType<T>(pub(crate) PhantomData<fn() -> T>);

impl<T: CtcpPayload> MessageType for CtcpType<T> {
    fn name(&self) -> &'static str {
        short_name::<T>()
    }

    fn can_parse(&self, line: &RawLine<'_>) -> bool {
        line.ctcp()
            .map_or(false, |frame| {
                frame.kind == T::KIND && frame.command.eq_ignore_ascii_case(T::COMMAND)
            })
    }

    fn parse(&self, line: &RawLine<'_>) -> Result<Message, MessageParseError> {
        let frame = line
            .ctcp()
            .ok_or_else(|| MessageParseError::InvalidCtcp(line.raw.to_string()))?;
        let data = frame.data.map(crate::ctcp::unquote);
        let payload = T::parse(data.as_deref())?;
        Ok(Message {
            prefix: line.sender()?,
            body: Body::Ctcp(CtcpMessage {
                target: frame.target.to_string(),
                ctcp: payload.into(),
            }),
        })
    }
}
