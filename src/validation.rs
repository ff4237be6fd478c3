//! Validation of protocol elements against server capabilities.
//!
//! Validation is advisory: senders call [`Message::validate`](crate::Message::validate)
//! before writing, and nothing here mutates the value being checked.
//!
//! # Protocol Element Validation
//!
//! - Nicknames: letter or special first, then letters, digits, specials or `-`
//! - Channel names: must start with one of the server's `CHANTYPES` and contain
//!   no space, comma, BEL or NUL
//! - Free text: no NUL, CR or LF

use crate::error::ModeParseError;

/// Control characters that are never valid in IRC messages.
///
/// These characters terminate or delimit IRC protocol lines.
pub const PROTOCOL_CONTROL_CHARS: &[char] = &[
    '\x00', // NUL - terminates strings
    '\x0D', // CR - line delimiter
    '\x0A', // LF - line delimiter
];

/// Characters that are invalid in channel names per RFC 2812.
const INVALID_CHAN_CHARS: &[char] = &[' ', ',', '\x07', '\x00'];

/// Result of validation operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// The input was empty.
    Empty,
    /// The input was too long.
    TooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        actual: usize,
    },
    /// Invalid character found at position.
    InvalidChar {
        /// The invalid character.
        ch: char,
        /// Position in the string.
        position: usize,
    },
    /// Invalid first character.
    InvalidFirstChar {
        /// The invalid character.
        ch: char,
    },
    /// A channel name does not start with an advertised channel type.
    InvalidChannelName(String),
    /// More targets than the server accepts for this command.
    TooManyTargets {
        /// The command being checked.
        command: &'static str,
        /// Server limit.
        max: usize,
        /// Targets supplied.
        actual: usize,
    },
    /// The server does not support the command at all.
    Unsupported(&'static str),
    /// A mode string does not decode under the server's mode grammar.
    Mode(ModeParseError),
    /// More parameterised mode changes than one MODE line may carry.
    TooManyModes {
        /// Server limit (`MODES`).
        max: usize,
        /// Changes supplied.
        actual: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Empty => write!(f, "input is empty"),
            ValidationError::TooLong { max, actual } => {
                write!(f, "input too long: {} characters (max {})", actual, max)
            }
            ValidationError::InvalidChar { ch, position } => {
                write!(f, "invalid character {:?} at position {}", ch, position)
            }
            ValidationError::InvalidFirstChar { ch } => {
                write!(f, "invalid first character: {:?}", ch)
            }
            ValidationError::InvalidChannelName(name) => {
                write!(f, "invalid channel name: {}", name)
            }
            ValidationError::TooManyTargets {
                command,
                max,
                actual,
            } => write!(f, "{} accepts at most {} targets, got {}", command, max, actual),
            ValidationError::Unsupported(command) => {
                write!(f, "server does not support {}", command)
            }
            ValidationError::Mode(err) => write!(f, "invalid mode string: {}", err),
            ValidationError::TooManyModes { max, actual } => {
                write!(f, "{} mode changes exceed the limit of {}", actual, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check if a character is a protocol control character (NUL, CR, LF).
#[inline]
pub fn is_protocol_control_char(c: char) -> bool {
    PROTOCOL_CONTROL_CHARS.contains(&c)
}

/// Validate free text (a message body, topic, reason, ...).
pub fn validate_text(text: &str, max_len: Option<usize>) -> Result<(), ValidationError> {
    if let Some(max) = max_len {
        let len = text.chars().count();
        if len > max {
            return Err(ValidationError::TooLong { max, actual: len });
        }
    }
    match text.char_indices().find(|(_, c)| is_protocol_control_char(*c)) {
        Some((position, ch)) => Err(ValidationError::InvalidChar { ch, position }),
        None => Ok(()),
    }
}

/// Validate an IRC nickname with a maximum length (ISUPPORT `NICKLEN`).
///
/// # Examples
///
/// ```
/// use nebo_irc::validation::validate_nickname;
///
/// assert!(validate_nickname("Nick", 9).is_ok());
/// assert!(validate_nickname("[test]", 9).is_ok());
/// assert!(validate_nickname("", 9).is_err());
/// assert!(validate_nickname("123nick", 9).is_err());
/// assert!(validate_nickname("nick name", 9).is_err());
/// ```
pub fn validate_nickname(nick: &str, max_len: usize) -> Result<(), ValidationError> {
    let mut chars = nick.chars();
    let first = chars.next().ok_or(ValidationError::Empty)?;

    let len = nick.chars().count();
    if len > max_len {
        return Err(ValidationError::TooLong {
            max: max_len,
            actual: len,
        });
    }

    if !is_valid_nick_first_char(first) {
        return Err(ValidationError::InvalidFirstChar { ch: first });
    }

    for (i, c) in chars.enumerate() {
        if !is_valid_nick_char(c) {
            return Err(ValidationError::InvalidChar {
                ch: c,
                position: i + 1,
            });
        }
    }

    Ok(())
}

/// Check if a character is valid as the first character of a nickname.
#[inline]
pub fn is_valid_nick_first_char(c: char) -> bool {
    c.is_ascii_alphabetic() || is_nick_special_char(c)
}

/// Check if a character is valid in a nickname (after first char).
#[inline]
pub fn is_valid_nick_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_nick_special_char(c) || c == '-'
}

/// Special chars per RFC 2812: `[ ] \ ` _ ^ { | }`.
#[inline]
pub fn is_nick_special_char(c: char) -> bool {
    let code = c as u32;
    (0x5B..=0x60).contains(&code) || (0x7B..=0x7D).contains(&code)
}

/// Validate a channel name against the advertised channel types.
///
/// # Examples
///
/// ```
/// use nebo_irc::validation::validate_channel_name;
///
/// assert!(validate_channel_name("#channel", "#&", 50).is_ok());
/// assert!(validate_channel_name("&local", "#&", 50).is_ok());
/// assert!(validate_channel_name("+modeless", "#&", 50).is_err());
/// assert!(validate_channel_name("#chan nel", "#&", 50).is_err());
/// ```
pub fn validate_channel_name(
    name: &str,
    channel_types: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let first = chars.next().ok_or(ValidationError::Empty)?;

    if !channel_types.contains(first) {
        return Err(ValidationError::InvalidChannelName(name.to_string()));
    }

    let len = name.chars().count();
    if len > max_len {
        return Err(ValidationError::TooLong {
            max: max_len,
            actual: len,
        });
    }

    for (i, c) in chars.enumerate() {
        if INVALID_CHAN_CHARS.contains(&c) || c.is_control() {
            return Err(ValidationError::InvalidChar {
                ch: c,
                position: i + 1,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nickname_validation() {
        assert!(validate_nickname("Nick123", 9).is_ok());
        assert!(validate_nickname("Nick_", 9).is_ok());
        assert!(validate_nickname("a-b", 9).is_ok());
        assert_eq!(
            validate_nickname("waytoolongnick", 9),
            Err(ValidationError::TooLong { max: 9, actual: 14 })
        );
        assert_eq!(
            validate_nickname("-dash", 9),
            Err(ValidationError::InvalidFirstChar { ch: '-' })
        );
        assert_eq!(
            validate_nickname("ni!ck", 9),
            Err(ValidationError::InvalidChar { ch: '!', position: 2 })
        );
    }

    #[test]
    fn test_channel_validation() {
        assert!(validate_channel_name("#rust", "#", 50).is_ok());
        assert_eq!(
            validate_channel_name("rust", "#&", 50),
            Err(ValidationError::InvalidChannelName("rust".into()))
        );
        assert!(validate_channel_name("#a,b", "#", 50).is_err());
        assert!(validate_channel_name("#bell\x07", "#", 50).is_err());
        assert!(validate_channel_name("", "#", 50).is_err());
    }

    #[test]
    fn test_text_validation() {
        assert!(validate_text("hello world", None).is_ok());
        assert!(validate_text("hello\r\nQUIT", None).is_err());
        assert_eq!(
            validate_text("abcdef", Some(3)),
            Err(ValidationError::TooLong { max: 3, actual: 6 })
        );
    }

    #[test]
    fn test_control_chars() {
        assert!(is_protocol_control_char('\0'));
        assert!(!is_protocol_control_char('\x01'));
        assert!(is_protocol_control_char('\n'));
        assert!(!is_protocol_control_char('a'));
    }
}
