//! The fallback for keywords no registered type claims.

use crate::message::{MessageWriter, RawLine};

/// An unrecognised command, kept exactly as received.
///
/// The keyword keeps its original case and the trailing marker is
/// remembered, so formatting reproduces the input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCommand {
    pub keyword: String,
    pub params: Vec<String>,
    /// Whether the last parameter was sent with a leading `:`.
    pub trailing: bool,
}

impl RawCommand {
    pub fn new(keyword: impl Into<String>, params: Vec<String>, trailing: bool) -> Self {
        RawCommand {
            keyword: keyword.into(),
            params,
            trailing,
        }
    }

    pub(crate) fn from_line(line: &RawLine<'_>) -> Self {
        RawCommand {
            keyword: line.command.to_string(),
            params: line.params.iter().map(|s| s.to_string()).collect(),
            trailing: line.trailing,
        }
    }

    pub(crate) fn write_params(&self, w: &mut MessageWriter) {
        let Some((last, middle)) = self.params.split_last() else {
            return;
        };
        for param in middle {
            w.param(param.as_str());
        }
        if self.trailing {
            w.trailing(last.as_str());
        } else {
            w.param(last.as_str());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_trailing_marker() {
        let line = RawLine::parse("FOO bar :baz").unwrap();
        let raw = RawCommand::from_line(&line);
        assert_eq!(raw.keyword, "FOO");
        assert!(raw.trailing);

        let mut w = MessageWriter::new();
        raw.write_params(&mut w);
        let mut out = String::from("FOO");
        w.write_to(&mut out).unwrap();
        assert_eq!(out, "FOO bar :baz");
    }
}
