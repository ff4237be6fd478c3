//! Error types for the IRC protocol library.
//!
//! [`ProtocolError`] is what callers see from the dispatcher and the
//! connection. It wraps a [`MessageParseError`] together with the raw line
//! that failed. [`ModeParseError`] comes out of the mode codec.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// A line exceeded the wire ceiling.
    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),

    /// Illegal control character in message.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

impl ProtocolError {
    /// Wrap a parse error together with the line it came from.
    pub fn invalid_message(string: impl Into<String>, cause: MessageParseError) -> Self {
        ProtocolError::InvalidMessage {
            string: string.into(),
            cause,
        }
    }

    /// The raw text that failed to parse, if this is a parse failure.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            ProtocolError::InvalidMessage { string, .. } => Some(string),
            _ => None,
        }
    }
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Line exceeded the protocol ceiling.
    #[error("line too long: {length} characters (limit {limit})")]
    LineTooLong {
        /// Length of the offending line.
        length: usize,
        /// Maximum accepted length.
        limit: usize,
    },

    /// Not enough arguments for the message type.
    #[error("not enough arguments: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Expected number of arguments.
        expected: usize,
        /// Actual number of arguments.
        got: usize,
    },

    /// An argument was invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid CTCP payload.
    #[error("invalid CTCP payload: {0}")]
    InvalidCtcp(String),

    /// Invalid message prefix.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// The tokenizer rejected the line.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Character position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        /// The source's message, kept across clones.
        source_message: Option<String>,
    },
}

impl MessageParseError {
    /// Shorthand for an arity failure.
    pub(crate) fn arity(expected: usize, got: usize) -> Self {
        MessageParseError::NotEnoughArguments { expected, got }
    }
}

impl Clone for MessageParseError {
    fn clone(&self) -> Self {
        match self {
            MessageParseError::EmptyMessage => MessageParseError::EmptyMessage,
            MessageParseError::LineTooLong { length, limit } => MessageParseError::LineTooLong {
                length: *length,
                limit: *limit,
            },
            MessageParseError::NotEnoughArguments { expected, got } => Self::arity(*expected, *got),
            MessageParseError::InvalidArgument(s) => MessageParseError::InvalidArgument(s.clone()),
            MessageParseError::InvalidCtcp(s) => MessageParseError::InvalidCtcp(s.clone()),
            MessageParseError::InvalidPrefix(s) => MessageParseError::InvalidPrefix(s.clone()),
            MessageParseError::ParseContext {
                position,
                context,
                source,
                source_message,
            } => MessageParseError::ParseContext {
                position: *position,
                context: context.clone(),
                // The boxed source cannot be cloned; keep its text.
                source: None,
                source_message: source_message
                    .clone()
                    .or_else(|| source.as_ref().map(|e| e.to_string())),
            },
        }
    }
}

/// Errors encountered when decoding mode strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeParseError {
    /// A mode letter needs an argument but the argument list is exhausted.
    #[error("mode '{mode}' requires an argument but none is left")]
    MissingArgument {
        /// The mode letter.
        mode: char,
    },

    /// Arguments were left over after every mode letter was consumed.
    #[error("{count} unused mode argument(s)")]
    UnusedArguments {
        /// How many arguments were not consumed.
        count: usize,
    },
}
