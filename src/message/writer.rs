//! Parameter writer used by every concrete message type.

use std::fmt::{self, Write};

/// Collects the parameters of one outgoing line in order.
///
/// Concrete types push their fields here; the envelope decides where the
/// keyword and prefix go. The last parameter is written with a leading `:`
/// when it is empty, contains a space, starts with `:`, or was pushed with
/// [`trailing`](Self::trailing).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MessageWriter {
    params: Vec<String>,
    force_trailing: bool,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a middle parameter.
    pub fn param(&mut self, value: impl Into<String>) -> &mut Self {
        self.params.push(value.into());
        self.force_trailing = false;
        self
    }

    /// Push a parameter if present.
    pub fn opt_param(&mut self, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.param(v);
        }
        self
    }

    /// Push each item as its own middle parameter.
    pub fn params_from<I, S>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in items {
            self.param(item.as_ref());
        }
        self
    }

    /// Push a list joined with `separator` as one parameter. Empty lists push
    /// nothing.
    pub fn list<I, S>(&mut self, items: I, separator: char) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for item in items {
            if !joined.is_empty() {
                joined.push(separator);
            }
            joined.push_str(item.as_ref());
        }
        if !joined.is_empty() {
            self.param(joined);
        }
        self
    }

    /// Push free text that is always written with a leading `:`.
    pub fn trailing(&mut self, value: impl Into<String>) -> &mut Self {
        self.params.push(value.into());
        self.force_trailing = true;
        self
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Write ` p1 p2 :last` after a keyword.
    pub(crate) fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        let Some((last, middle)) = self.params.split_last() else {
            return Ok(());
        };
        for param in middle {
            out.write_char(' ')?;
            out.write_str(param)?;
        }
        out.write_char(' ')?;
        if self.force_trailing || needs_colon(last) {
            out.write_char(':')?;
        }
        out.write_str(last)
    }
}

/// Does a final parameter need the `:` marker to survive the trip?
#[inline]
pub(crate) fn needs_colon(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(w: &MessageWriter) -> String {
        let mut s = String::from("CMD");
        w.write_to(&mut s).unwrap();
        s
    }

    #[test]
    fn colon_only_when_needed() {
        let mut w = MessageWriter::new();
        w.param("#chan").param("word");
        assert_eq!(render(&w), "CMD #chan word");

        let mut w = MessageWriter::new();
        w.param("#chan").param("two words");
        assert_eq!(render(&w), "CMD #chan :two words");

        let mut w = MessageWriter::new();
        w.param(":x");
        assert_eq!(render(&w), "CMD ::x");

        let mut w = MessageWriter::new();
        w.param("");
        assert_eq!(render(&w), "CMD :");
    }

    #[test]
    fn forced_trailing_and_lists() {
        let mut w = MessageWriter::new();
        w.list(["#a", "#b"], ',').trailing("bye");
        assert_eq!(render(&w), "CMD #a,#b :bye");

        let mut w = MessageWriter::new();
        w.list(Vec::<String>::new(), ',').opt_param(None).opt_param(Some("x"));
        assert_eq!(render(&w), "CMD x");

        assert_eq!(render(&MessageWriter::new()), "CMD");
    }
}
