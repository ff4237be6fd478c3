//! User query numerics: AWAY, USERHOST, ISON, WHO, WHOIS and WHOWAS.

use super::{NumericMessage, Response};
use crate::error::MessageParseError;
use crate::message::args::{number, required, text};
use crate::message::MessageWriter;

simple_numeric! {
    /// 301 `nick :away message`
    AwayReply = RPL_AWAY { nickname ; message }
}
simple_numeric! {
    /// 305 `:You are no longer marked as being away`
    UnAway = RPL_UNAWAY { ; text }
}
simple_numeric! {
    /// 306 `:You have been marked as being away`
    NowAway = RPL_NOWAWAY { ; text }
}

/// One `nick[*]=(+|-)user@host` item of a USERHOST reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserhostEntry {
    pub nickname: String,
    pub operator: bool,
    pub away: bool,
    /// `user@host`
    pub hostname: String,
}

impl UserhostEntry {
    fn parse(item: &str) -> Result<Self, MessageParseError> {
        let invalid = || MessageParseError::InvalidArgument(format!("bad USERHOST entry {:?}", item));
        let (name, value) = item.split_once('=').ok_or_else(invalid)?;
        let (nickname, operator) = match name.strip_suffix('*') {
            Some(nick) => (nick, true),
            None => (name, false),
        };
        let away = match value.chars().next() {
            Some('-') => true,
            Some('+') => false,
            _ => return Err(invalid()),
        };
        if nickname.is_empty() {
            return Err(invalid());
        }
        Ok(UserhostEntry {
            nickname: nickname.to_string(),
            operator,
            away,
            hostname: value[1..].to_string(),
        })
    }
}

impl std::fmt::Display for UserhostEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}={}{}",
            self.nickname,
            if self.operator { "*" } else { "" },
            if self.away { '-' } else { '+' },
            self.hostname
        )
    }
}

/// 302 `:entry entry ...`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserhostReply {
    pub entries: Vec<UserhostEntry>,
}

impl NumericMessage for UserhostReply {
    const CODE: Response = Response::RPL_USERHOST;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        let entries = text(params, 0)
            .split_whitespace()
            .map(UserhostEntry::parse)
            .collect::<Result<_, _>>()?;
        Ok(UserhostReply { entries })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        let joined: Vec<String> = self.entries.iter().map(|e| e.to_string()).collect();
        w.trailing(joined.join(" "));
    }
}

/// 303 `:nick nick ...`, listing the queried nicknames that are online.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct IsonReply {
    pub nicknames: Vec<String>,
}

impl NumericMessage for IsonReply {
    const CODE: Response = Response::RPL_ISON;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        // Some servers split the list over several middle parameters.
        let nicknames = params
            .iter()
            .flat_map(|p| p.split_whitespace())
            .map(str::to_string)
            .collect();
        Ok(IsonReply { nicknames })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.trailing(self.nicknames.join(" "));
    }
}

macro_rules! user_info_numeric {
    ($(#[$doc:meta])* $name:ident = $code:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub nickname: String,
            pub username: String,
            pub host: String,
            pub realname: String,
        }

        impl NumericMessage for $name {
            const CODE: Response = Response::$code;

            fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
                Ok($name {
                    nickname: required(params, 0)?.to_string(),
                    username: required(params, 1)?.to_string(),
                    host: required(params, 2)?.to_string(),
                    realname: text(params, 4),
                })
            }

            fn write_params(&self, w: &mut MessageWriter) {
                w.param(self.nickname.as_str())
                    .param(self.username.as_str())
                    .param(self.host.as_str())
                    .param("*")
                    .trailing(self.realname.as_str());
            }
        }
    };
}

user_info_numeric! {
    /// 311 `nick user host * :realname`
    WhoisUser = RPL_WHOISUSER
}
user_info_numeric! {
    /// 314 `nick user host * :realname`
    WhowasUser = RPL_WHOWASUSER
}

simple_numeric! {
    /// 312 `nick server :server info`
    WhoisServer = RPL_WHOISSERVER { nickname, server ; info }
}
simple_numeric! {
    /// 313 `nick :is an IRC operator`
    WhoisOperator = RPL_WHOISOPERATOR { nickname ; text }
}
simple_numeric! {
    /// 315 `mask :End of WHO list`
    EndOfWho = RPL_ENDOFWHO { mask ; text }
}
simple_numeric! {
    /// 318 `nick :End of WHOIS list`
    EndOfWhois = RPL_ENDOFWHOIS { nickname ; text }
}
simple_numeric! {
    /// 369 `nick :End of WHOWAS`
    EndOfWhowas = RPL_ENDOFWHOWAS { nickname ; text }
}

/// 317 `nick idle [signon] :seconds idle`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhoisIdle {
    pub nickname: String,
    /// Seconds since the last message.
    pub idle: u64,
    /// Unix time of sign-on, when the server sends it.
    pub signon: Option<i64>,
    pub text: String,
}

impl NumericMessage for WhoisIdle {
    const CODE: Response = Response::RPL_WHOISIDLE;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        let nickname = required(params, 0)?.to_string();
        let idle = number(required(params, 1)?, "idle")?;
        let (signon, text) = if params.len() >= 4 {
            (Some(number(params[2], "signon")?), params[3].to_string())
        } else {
            (None, text(params, 2))
        };
        Ok(WhoisIdle {
            nickname,
            idle,
            signon,
            text,
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.nickname.as_str()).param(self.idle.to_string());
        if let Some(signon) = self.signon {
            w.param(signon.to_string());
        }
        w.trailing(self.text.as_str());
    }
}

/// 319 `nick :{[prefix]channel}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhoisChannels {
    pub nickname: String,
    /// Channel names, each possibly led by a membership prefix symbol.
    pub channels: Vec<String>,
}

impl NumericMessage for WhoisChannels {
    const CODE: Response = Response::RPL_WHOISCHANNELS;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(WhoisChannels {
            nickname: required(params, 0)?.to_string(),
            channels: text(params, 1).split_whitespace().map(str::to_string).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.nickname.as_str()).trailing(self.channels.join(" "));
    }
}

/// 352 `channel user host server nick flags :hopcount realname`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhoReply {
    pub channel: String,
    pub username: String,
    pub host: String,
    pub server: String,
    pub nickname: String,
    /// `H` or `G`, then `*` for operators, then membership prefixes.
    pub flags: String,
    pub hopcount: u32,
    pub realname: String,
}

impl WhoReply {
    /// `G`one rather than `H`ere.
    pub fn is_away(&self) -> bool {
        self.flags.starts_with('G')
    }

    pub fn is_operator(&self) -> bool {
        self.flags.contains('*')
    }
}

impl NumericMessage for WhoReply {
    const CODE: Response = Response::RPL_WHOREPLY;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        let last = required(params, 6)?;
        let (hops, realname) = last.split_once(' ').unwrap_or((last, ""));
        Ok(WhoReply {
            channel: params[0].to_string(),
            username: params[1].to_string(),
            host: params[2].to_string(),
            server: params[3].to_string(),
            nickname: params[4].to_string(),
            flags: params[5].to_string(),
            hopcount: number(hops, "hopcount")?,
            realname: realname.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str())
            .param(self.username.as_str())
            .param(self.host.as_str())
            .param(self.server.as_str())
            .param(self.nickname.as_str())
            .param(self.flags.as_str())
            .trailing(format!("{} {}", self.hopcount, self.realname));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn userhost_entries() {
        let reply = UserhostReply::parse(&["alice*=+al@host.a bob=-b@host.b"]).unwrap();
        assert_eq!(reply.entries.len(), 2);
        assert!(reply.entries[0].operator);
        assert!(!reply.entries[0].away);
        assert!(reply.entries[1].away);
        assert_eq!(reply.entries[1].hostname, "b@host.b");
        assert_eq!(reply.entries[0].to_string(), "alice*=+al@host.a");
        assert!(UserhostReply::parse(&["broken"]).is_err());
        assert!(UserhostReply::parse(&[""]).unwrap().entries.is_empty());
    }

    #[test]
    fn ison_accepts_split_lists() {
        assert_eq!(IsonReply::parse(&["alice bob"]).unwrap().nicknames, vec!["alice", "bob"]);
        assert_eq!(IsonReply::parse(&["alice", "bob"]).unwrap().nicknames, vec!["alice", "bob"]);
        assert!(IsonReply::parse(&[""]).unwrap().nicknames.is_empty());
    }

    #[test]
    fn whois_idle_with_and_without_signon() {
        let full = WhoisIdle::parse(&["bob", "12", "1700000000", "seconds idle, signon time"]).unwrap();
        assert_eq!(full.idle, 12);
        assert_eq!(full.signon, Some(1_700_000_000));
        let short = WhoisIdle::parse(&["bob", "12", "seconds idle"]).unwrap();
        assert_eq!(short.signon, None);
        assert_eq!(short.text, "seconds idle");
    }

    #[test]
    fn who_reply_splits_hopcount() {
        let who = WhoReply::parse(&["#rust", "al", "host", "irc.a", "alice", "G*@", "0 Alice Liddell"]).unwrap();
        assert_eq!(who.hopcount, 0);
        assert_eq!(who.realname, "Alice Liddell");
        assert!(who.is_away());
        assert!(who.is_operator());
        assert!(WhoReply::parse(&["#rust", "al"]).is_err());
    }

    #[test]
    fn whois_user_skips_star() {
        let user = WhoisUser::parse(&["bob", "b", "host", "*", "Bob B"]).unwrap();
        assert_eq!(user.realname, "Bob B");
        let mut w = MessageWriter::new();
        user.write_params(&mut w);
        assert_eq!(w.params(), ["bob", "b", "host", "*", "Bob B"]);
    }
}
