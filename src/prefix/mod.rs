//! IRC message prefix (source) types.

use std::fmt;
use std::str::FromStr;

use crate::error::MessageParseError;

/// The sender of a message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prefix {
    /// A server name, e.g. `irc.example.net`.
    ServerName(String),
    /// `nick!user@host`. User and host may be empty.
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix without its leading `:`.
    ///
    /// A bare token containing a `.` and neither `!` nor `@` is taken to be
    /// a server name; anything else is a nickname triple.
    pub fn parse(s: &str) -> Result<Prefix, MessageParseError> {
        if s.is_empty() || s.chars().any(|c| c == ' ' || c.is_control()) {
            return Err(MessageParseError::InvalidPrefix(s.to_string()));
        }

        let (rest, host) = match s.split_once('@') {
            Some((rest, host)) => (rest, Some(host)),
            None => (s, None),
        };
        let (nick, user) = match rest.split_once('!') {
            Some((nick, user)) => (nick, Some(user)),
            None => (rest, None),
        };

        if nick.is_empty() {
            return Err(MessageParseError::InvalidPrefix(s.to_string()));
        }

        if user.is_none() && host.is_none() && nick.contains('.') {
            return Ok(Prefix::ServerName(nick.to_string()));
        }

        Ok(Prefix::Nickname(
            nick.to_string(),
            user.unwrap_or_default().to_string(),
            host.unwrap_or_default().to_string(),
        ))
    }

    /// Build a `nick!user@host` prefix.
    pub fn new_user(nick: &str, user: &str, host: &str) -> Prefix {
        Prefix::Nickname(nick.to_string(), user.to_string(), host.to_string())
    }

    /// The nickname, for user prefixes.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) => Some(nick),
            Prefix::ServerName(_) => None,
        }
    }

    pub fn user(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(_, user, _) if !user.is_empty() => Some(user),
            _ => None,
        }
    }

    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }

    /// The nickname or server name, whichever this is.
    pub fn name(&self) -> &str {
        match self {
            Prefix::ServerName(name) => name,
            Prefix::Nickname(nick, _, _) => nick,
        }
    }
}

impl FromStr for Prefix {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prefix::parse(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{}", user)?;
                }
                if !host.is_empty() {
                    write!(f, "@{}", host)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_user_prefix() {
        let p = Prefix::parse("nick!user@host.example").unwrap();
        assert_eq!(p, Prefix::new_user("nick", "user", "host.example"));
        assert_eq!(p.nick(), Some("nick"));
        assert_eq!(p.user(), Some("user"));
        assert_eq!(p.host(), Some("host.example"));
        assert_eq!(p.to_string(), "nick!user@host.example");
    }

    #[test]
    fn server_name_vs_bare_nick() {
        assert_eq!(
            Prefix::parse("irc.example.net").unwrap(),
            Prefix::ServerName("irc.example.net".into())
        );
        let p = Prefix::parse("alice").unwrap();
        assert_eq!(p.nick(), Some("alice"));
        assert_eq!(p.user(), None);
        assert_eq!(p.to_string(), "alice");
    }

    #[test]
    fn partial_triples() {
        assert_eq!(Prefix::parse("nick@host").unwrap().to_string(), "nick@host");
        assert_eq!(Prefix::parse("nick!user").unwrap().host(), None);
    }

    #[test]
    fn rejects_malformed() {
        assert!(Prefix::parse("").is_err());
        assert!(Prefix::parse("!user@host").is_err());
        assert!(Prefix::parse("bad\x07nick").is_err());
    }
}
