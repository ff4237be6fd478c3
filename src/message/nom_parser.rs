//! Nom-based IRC line tokenizer.
//!
//! Splits one line into prefix, command and parameters without allocating
//! per field. Everything borrows from the input.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    error::{context, ErrorKind, VerboseError, VerboseErrorKind},
    sequence::preceded,
    IResult,
};

use crate::ctcp::CtcpKind;
use crate::error::MessageParseError;
use crate::prefix::Prefix;

type ParseResult<I, O> = IResult<I, O, VerboseError<I>>;

/// The CTCP delimiter byte.
pub(crate) const CTCP_DELIM: char = '\x01';

/// Parse message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing message prefix",
        preceded(char(':'), take_while1(|c| c != ' ')),
    )(input)
}

/// Parse the command name (alphanumeric characters).
fn parse_command(input: &str) -> ParseResult<&str, &str> {
    context(
        "parsing IRC command",
        take_while1(|c: char| c.is_ascii_alphanumeric()),
    )(input)
}

/// Parse a complete line into its components.
///
/// ```text
/// [:prefix] <command> [params...] [:trailing]
/// ```
///
/// Runs of spaces between parameters are collapsed. Anything other than a
/// space or the line ending directly after the command is an error.
pub fn parse_line(input: &str) -> ParseResult<&str, RawLine<'_>> {
    let raw = input;
    let (input, _) = space0(input)?;
    let (input, prefix) = context("parsing optional prefix", opt(parse_prefix))(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = context("parsing required command", parse_command)(input)?;

    let mut params: Vec<&str> = Vec::new();
    let mut trailing = false;
    let mut rest = input;

    loop {
        let trimmed = rest.trim_start_matches(' ');
        if trimmed.len() == rest.len() {
            // No separator: either end of line or a stray character.
            break;
        }
        rest = trimmed;

        if let Some(after_colon) = rest.strip_prefix(':') {
            let end = after_colon.find(['\r', '\n']).unwrap_or(after_colon.len());
            params.push(&after_colon[..end]);
            trailing = true;
            rest = &after_colon[end..];
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        if end == 0 {
            break;
        }
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    if !rest.trim_start_matches(['\r', '\n']).is_empty() {
        return Err(nom::Err::Error(VerboseError {
            errors: vec![(rest, VerboseErrorKind::Context("expecting a space after the command"))],
        }));
    }

    Ok((
        rest,
        RawLine {
            raw,
            prefix,
            command,
            params,
            trailing,
        },
    ))
}

/// A tokenized line with borrowed slices.
///
/// This is what every [`MessageType`](crate::dispatch::MessageType) sees in
/// `can_parse` and `parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine<'a> {
    /// The whole input line.
    pub raw: &'a str,
    /// Prefix without the leading `:`.
    pub prefix: Option<&'a str>,
    /// Command keyword or numeric code, as sent.
    pub command: &'a str,
    /// Parameters, the trailing one included.
    pub params: Vec<&'a str>,
    /// Whether the last parameter was `:`-prefixed on the wire.
    pub trailing: bool,
}

/// A CTCP payload located inside a PRIVMSG or NOTICE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtcpFrame<'a> {
    /// Request for PRIVMSG, reply for NOTICE.
    pub kind: CtcpKind,
    /// The message target.
    pub target: &'a str,
    /// The inner command, as sent.
    pub command: &'a str,
    /// Data after the command, still quoted.
    pub data: Option<&'a str>,
}

impl<'a> RawLine<'a> {
    /// Tokenize one line. The line must not be empty.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        match parse_line(input) {
            Ok((_remaining, line)) => Ok(line),
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                let detailed = DetailedParseError::from_verbose(input, &e);
                Err(MessageParseError::ParseContext {
                    position: detailed.position,
                    context: detailed.context.unwrap_or("parsing line").to_string(),
                    source: Some(Box::new(detailed)),
                    source_message: None,
                })
            }
            Err(nom::Err::Incomplete(_)) => Err(MessageParseError::ParseContext {
                position: input.len(),
                context: "incomplete input".to_string(),
                source: None,
                source_message: None,
            }),
        }
    }

    /// Parse the prefix, if present.
    pub fn sender(&self) -> Result<Option<Prefix>, MessageParseError> {
        self.prefix.map(Prefix::parse).transpose()
    }

    /// The numeric code, if the command is exactly three digits.
    pub fn numeric_code(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }

    /// Locate a CTCP payload: a PRIVMSG or NOTICE whose final parameter is
    /// wrapped in `\x01`. The closing delimiter is optional.
    pub fn ctcp(&self) -> Option<CtcpFrame<'a>> {
        let kind = if self.command.eq_ignore_ascii_case("PRIVMSG") {
            CtcpKind::Request
        } else if self.command.eq_ignore_ascii_case("NOTICE") {
            CtcpKind::Reply
        } else {
            return None;
        };
        if self.params.len() != 2 {
            return None;
        }
        let body = self.params[1].strip_prefix(CTCP_DELIM)?;
        let body = body.strip_suffix(CTCP_DELIM).unwrap_or(body);
        let (command, data) = match body.split_once(' ') {
            Some((command, data)) => (command, Some(data)),
            None => (body, None),
        };
        if command.is_empty() {
            return None;
        }
        Some(CtcpFrame {
            kind,
            target: self.params[0],
            command,
            data,
        })
    }
}

/// Detailed parse error with position and context information.
#[derive(Debug, Clone)]
pub struct DetailedParseError {
    /// The original input string that failed to parse.
    pub input: String,
    /// Character position where parsing failed.
    pub position: usize,
    /// Context about what was being parsed when the error occurred.
    pub context: Option<&'static str>,
    /// The nom error kind.
    pub kind: ErrorKind,
}

impl DetailedParseError {
    fn from_verbose(input: &str, e: &VerboseError<&str>) -> Self {
        let mut context_info = None;
        let mut position = input.len();
        let mut kind = ErrorKind::Tag;

        for (error_input, error_kind) in &e.errors {
            position = input.len() - error_input.len();
            match error_kind {
                VerboseErrorKind::Context(ctx) => {
                    context_info = Some(*ctx);
                }
                VerboseErrorKind::Nom(ek) => {
                    kind = *ek;
                }
                VerboseErrorKind::Char(_) => {
                    kind = ErrorKind::Char;
                }
            }
        }

        DetailedParseError {
            input: input.to_string(),
            position,
            context: context_info,
            kind,
        }
    }
}

impl std::fmt::Display for DetailedParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at position {}", self.position)?;
        if let Some(ctx) = self.context {
            write!(f, " while {}", ctx)?;
        }
        write!(f, ": {:?}", self.kind)?;

        match (self.input.get(..self.position), self.input.get(self.position..)) {
            (Some(before), Some(after)) if !after.is_empty() => {
                write!(f, "\n  Input: {}<<<HERE>>>{}", before, after)
            }
            _ => write!(f, "\n  Input: {}<<<EOF>>>", self.input),
        }
    }
}

impl std::error::Error for DetailedParseError {}
