//! IRC case-mapping functions.
//!
//! IRC uses a special case-insensitive comparison where some characters
//! are considered equivalent (e.g., `[` and `{`). Which characters fold is
//! advertised by the server through the `CASEMAPPING` token.

use std::fmt;
use std::str::FromStr;

/// Case mapping advertised by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseMapping {
    /// Only `A-Z` fold to `a-z`.
    Ascii,
    /// ASCII plus `[]\~` folding to `{}|^`.
    #[default]
    Rfc1459,
    /// ASCII plus `[]\` folding to `{}|` (no `~`).
    StrictRfc1459,
}

impl CaseMapping {
    /// Fold a single character.
    #[inline]
    pub fn fold(self, c: char) -> char {
        match (self, c) {
            (_, 'A'..='Z') => c.to_ascii_lowercase(),
            (CaseMapping::Ascii, _) => c,
            (_, '[') => '{',
            (_, ']') => '}',
            (_, '\\') => '|',
            (CaseMapping::Rfc1459, '~') => '^',
            _ => c,
        }
    }

    /// Convert a string to lowercase under this mapping.
    pub fn to_lower(self, s: &str) -> String {
        s.chars().map(|c| self.fold(c)).collect()
    }

    /// Compare two strings case-insensitively under this mapping.
    pub fn eq(self, a: &str, b: &str) -> bool {
        if a.len() != b.len() {
            return false;
        }
        a.chars()
            .zip(b.chars())
            .all(|(ca, cb)| self.fold(ca) == self.fold(cb))
    }

    /// The token value a server uses for this mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            CaseMapping::Ascii => "ascii",
            CaseMapping::Rfc1459 => "rfc1459",
            CaseMapping::StrictRfc1459 => "strict-rfc1459",
        }
    }
}

impl FromStr for CaseMapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(CaseMapping::Ascii),
            "rfc1459" => Ok(CaseMapping::Rfc1459),
            "strict-rfc1459" => Ok(CaseMapping::StrictRfc1459),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for CaseMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    CaseMapping::Rfc1459.to_lower(s)
}

/// Compare two strings using RFC 1459 case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    CaseMapping::Rfc1459.eq(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc1459_folds_brackets_and_tilde() {
        assert_eq!(irc_to_lower("Nick[A]\\~"), "nick{a}|^");
        assert!(irc_eq("FOO[1]", "foo{1}"));
    }

    #[test]
    fn strict_keeps_tilde() {
        let m = CaseMapping::StrictRfc1459;
        assert_eq!(m.to_lower("A~[]"), "a~{}");
        assert!(!m.eq("a~", "a^"));
    }

    #[test]
    fn ascii_only_letters() {
        let m = CaseMapping::Ascii;
        assert_eq!(m.to_lower("AB[]"), "ab[]");
        assert!(!m.eq("[", "{"));
    }

    #[test]
    fn parse_names() {
        assert_eq!("RFC1459".parse::<CaseMapping>(), Ok(CaseMapping::Rfc1459));
        assert_eq!("ascii".parse::<CaseMapping>(), Ok(CaseMapping::Ascii));
        assert!("rfc7613".parse::<CaseMapping>().is_err());
    }
}
