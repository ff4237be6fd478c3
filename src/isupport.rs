//! RPL_ISUPPORT (005) token parsing and the server capability model.
//!
//! [`Isupport`] and the composite views ([`ChanModes`], [`PrefixSpec`],
//! [`TargMax`], [`MaxList`], [`ChanLimit`]) borrow from the reply and never
//! allocate per token. [`ServerSupport`] is the owned, mutable bag the rest of
//! the crate consults.

mod support;

pub use self::support::{ModeClass, ServerSupport};

use tracing::debug;

/// One `KEY` or `KEY=VALUE` token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

/// The tokens of one RPL_ISUPPORT reply, in wire order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    /// Parse bare tokens. Parsing stops at a `:`-prefixed token (the
    /// human-readable tail) and skips empty ones.
    pub fn parse_params<I>(params: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = Vec::new();
        for p in params {
            if p.starts_with(':') {
                break;
            }
            if p.is_empty() {
                continue;
            }
            let (key, value) = match p.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (p, None),
            };
            entries.push(IsupportEntry { key, value });
        }
        Isupport { entries }
    }

    /// Parse the tokens of a typed [`SupportReply`](crate::response::SupportReply).
    pub fn from_reply(reply: &'a crate::response::SupportReply) -> Self {
        Self::parse_params(reply.tokens.iter().map(String::as_str))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key; the last occurrence wins.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    pub fn chanmodes(&self) -> Option<ChanModes<'a>> {
        self.get("CHANMODES").flatten().and_then(ChanModes::parse)
    }

    pub fn prefix(&self) -> Option<PrefixSpec<'a>> {
        self.get("PREFIX").flatten().and_then(PrefixSpec::parse)
    }
}

/// `PREFIX=(modes)symbols`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixSpec<'a> {
    pub modes: &'a str,
    pub prefixes: &'a str,
}

impl<'a> PrefixSpec<'a> {
    /// Parse `(ov)@+`. Mode and symbol counts must match.
    pub fn parse(s: &'a str) -> Option<Self> {
        let rest = s.strip_prefix('(')?;
        let (modes, prefixes) = rest.split_once(')')?;
        if modes.chars().count() != prefixes.chars().count() {
            return None;
        }
        Some(PrefixSpec { modes, prefixes })
    }
}

/// `CHANMODES=A,B,C,D`. Missing groups are `None`; groups past the fourth
/// are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChanModes<'a> {
    pub a: Option<&'a str>,
    pub b: Option<&'a str>,
    pub c: Option<&'a str>,
    pub d: Option<&'a str>,
}

impl<'a> ChanModes<'a> {
    pub fn parse(s: &'a str) -> Option<Self> {
        let mut parts = s.split(',');
        Some(ChanModes {
            a: parts.next(),
            b: parts.next(),
            c: parts.next(),
            d: parts.next(),
        })
    }
}

/// Split a composite value on `,` then `:`, skipping malformed pairs.
fn split_pairs<'a>(key: &'static str, s: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
    s.split(',').filter(|p| !p.is_empty()).filter_map(move |part| {
        let pair = part.split_once(':');
        if pair.is_none() {
            debug!(key, pair = part, "skipping malformed ISUPPORT pair");
        }
        pair
    })
}

/// `TARGMAX=PRIVMSG:4,NOTICE:4,JOIN:`. An empty limit means "no limit".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargMax<'a> {
    entries: Vec<(&'a str, Option<usize>)>,
}

impl<'a> TargMax<'a> {
    pub fn parse(s: &'a str) -> Self {
        let mut entries = Vec::new();
        for (cmd, num) in split_pairs("TARGMAX", s) {
            if cmd.is_empty() {
                continue;
            }
            if num.is_empty() {
                entries.push((cmd, None));
                continue;
            }
            match num.parse::<usize>() {
                Ok(n) => entries.push((cmd, Some(n))),
                Err(_) => debug!(command = cmd, limit = num, "skipping malformed TARGMAX entry"),
            }
        }
        TargMax { entries }
    }

    pub fn get(&self, cmd: &str) -> Option<Option<usize>> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(cmd))
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Option<usize>)> + '_ {
        self.entries.iter().copied()
    }
}

/// `MAXLIST=beI:100,q:50`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaxList {
    entries: Vec<(char, usize)>,
}

impl MaxList {
    pub fn parse(s: &str) -> Self {
        let mut entries: Vec<(char, usize)> = Vec::new();
        for (modes, limit) in split_pairs("MAXLIST", s) {
            let limit: usize = match limit.parse() {
                Ok(n) => n,
                Err(_) => {
                    debug!(modes, limit, "skipping malformed MAXLIST entry");
                    continue;
                }
            };
            for ch in modes.chars() {
                entries.retain(|(c, _)| *c != ch);
                entries.push((ch, limit));
            }
        }
        MaxList { entries }
    }

    pub fn limit_for(&self, mode: char) -> Option<usize> {
        self.entries
            .iter()
            .rev()
            .find(|(c, _)| *c == mode)
            .map(|(_, n)| *n)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
        self.entries.iter().copied()
    }
}

/// `CHANLIMIT=#&:20,+:`. Entries with an empty limit are dropped (no limit).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChanLimit<'a> {
    entries: Vec<(&'a str, usize)>,
}

impl<'a> ChanLimit<'a> {
    pub fn parse(s: &'a str) -> Self {
        let mut entries = Vec::new();
        for (prefixes, limit) in split_pairs("CHANLIMIT", s) {
            if prefixes.is_empty() || limit.is_empty() {
                continue;
            }
            match limit.parse::<usize>() {
                Ok(n) => entries.push((prefixes, n)),
                Err(_) => debug!(prefixes, limit, "skipping malformed CHANLIMIT entry"),
            }
        }
        ChanLimit { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, usize)> + '_ {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens_until_trailing_text() {
        let isupport = Isupport::parse_params(["NICKLEN=16", "SAFELIST", "", ":are supported"]);
        assert_eq!(isupport.len(), 2);
        assert_eq!(isupport.get("nicklen"), Some(Some("16")));
        assert_eq!(isupport.get("SAFELIST"), Some(None));
        assert_eq!(isupport.get("WATCH"), None);
    }

    #[test]
    fn last_occurrence_wins() {
        let isupport = Isupport::parse_params(["MODES=3", "MODES=6"]);
        assert_eq!(isupport.get("MODES"), Some(Some("6")));
    }

    #[test]
    fn prefix_spec() {
        let p = PrefixSpec::parse("(qaohv)~&@%+").unwrap();
        assert_eq!(p.modes, "qaohv");
        assert_eq!(p.prefixes, "~&@%+");
        assert!(PrefixSpec::parse("(ov)@").is_none());
        assert!(PrefixSpec::parse("ov@+").is_none());
        assert_eq!(PrefixSpec::parse("()"), Some(PrefixSpec { modes: "", prefixes: "" }));
    }

    #[test]
    fn chanmodes_short_and_long() {
        let cm = ChanModes::parse("b,k").unwrap();
        assert_eq!((cm.a, cm.b, cm.c, cm.d), (Some("b"), Some("k"), None, None));

        let cm = ChanModes::parse("beI,k,l,imnpst,XYZ").unwrap();
        assert_eq!(cm.d, Some("imnpst"));
    }

    #[test]
    fn targmax_skips_malformed_pairs() {
        let t = TargMax::parse("PRIVMSG:4,JOIN:,KICK:x,BOGUS,NOTICE:3");
        assert_eq!(t.get("privmsg"), Some(Some(4)));
        assert_eq!(t.get("JOIN"), Some(None));
        assert_eq!(t.get("KICK"), None);
        assert_eq!(t.get("NOTICE"), Some(Some(3)));
        assert_eq!(t.iter().count(), 3);
    }

    #[test]
    fn maxlist_skips_malformed_pairs() {
        let m = MaxList::parse("bq:100,e,I:abc,e:20");
        assert_eq!(m.limit_for('b'), Some(100));
        assert_eq!(m.limit_for('q'), Some(100));
        assert_eq!(m.limit_for('e'), Some(20));
        assert_eq!(m.limit_for('I'), None);
    }

    #[test]
    fn chanlimit_drops_unlimited() {
        let c = ChanLimit::parse("#&:20,+:,!:x");
        assert_eq!(c.iter().collect::<Vec<_>>(), vec![("#&", 20)]);
    }
}
