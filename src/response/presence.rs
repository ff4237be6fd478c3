//! WATCH (600-607, 512) and MONITOR (730-734) numerics.

use super::{NumericMessage, Response};
use crate::error::MessageParseError;
use crate::message::args::{number, required, split_list, text};
use crate::message::MessageWriter;

macro_rules! watch_numeric {
    ($(#[$doc:meta])* $name:ident = $code:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub nickname: String,
            pub username: String,
            pub host: String,
            /// Unix time of the state change, `0` when unknown.
            pub since: i64,
            pub text: String,
        }

        impl NumericMessage for $name {
            const CODE: Response = Response::$code;

            fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
                Ok($name {
                    nickname: required(params, 0)?.to_string(),
                    username: required(params, 1)?.to_string(),
                    host: required(params, 2)?.to_string(),
                    since: number(required(params, 3)?, "timestamp")?,
                    text: text(params, 4),
                })
            }

            fn write_params(&self, w: &mut MessageWriter) {
                w.param(self.nickname.as_str())
                    .param(self.username.as_str())
                    .param(self.host.as_str())
                    .param(self.since.to_string())
                    .trailing(self.text.as_str());
            }
        }
    };
}

watch_numeric! {
    /// 600 `nick user host since :logged online`
    LogOn = RPL_LOGON
}
watch_numeric! {
    /// 601 `nick user host since :logged offline`
    LogOff = RPL_LOGOFF
}
watch_numeric! {
    /// 602 `nick user host since :stopped watching`
    WatchOff = RPL_WATCHOFF
}
watch_numeric! {
    /// 604 `nick user host since :is online`
    NowOn = RPL_NOWON
}
watch_numeric! {
    /// 605 `nick user host since :is offline`
    NowOff = RPL_NOWOFF
}

simple_numeric! {
    /// 603 `:You have N and are on M WATCH entries`
    WatchStat = RPL_WATCHSTAT { ; text }
}

/// 606 `:nick nick ...`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct WatchListReply {
    pub nicknames: Vec<String>,
}

impl NumericMessage for WatchListReply {
    const CODE: Response = Response::RPL_WATCHLIST;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(WatchListReply {
            nicknames: text(params, 0).split_whitespace().map(str::to_string).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.trailing(self.nicknames.join(" "));
    }
}

simple_numeric! {
    /// 607 `:End of WATCH list`
    EndOfWatchList = RPL_ENDOFWATCHLIST { ; text }
}
simple_numeric! {
    /// 512 `nick :Maximum size for WATCH-list is N entries`
    TooManyWatch = ERR_TOOMANYWATCH { nickname ; text }
}

/// 730 `:target[,target...]` where each target is `nick` or `nick!user@host`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MonOnline {
    pub targets: Vec<String>,
}

impl MonOnline {
    /// The nickname part of each target.
    pub fn nicknames(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .map(|t| t.split_once('!').map_or(t.as_str(), |(nick, _)| nick))
    }
}

impl NumericMessage for MonOnline {
    const CODE: Response = Response::RPL_MONONLINE;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(MonOnline {
            targets: split_list(required(params, 0)?, ','),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.trailing(self.targets.join(","));
    }
}

macro_rules! monitor_list_numeric {
    ($(#[$doc:meta])* $name:ident = $code:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Default)]
        pub struct $name {
            pub nicknames: Vec<String>,
        }

        impl NumericMessage for $name {
            const CODE: Response = Response::$code;

            fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
                Ok($name {
                    nicknames: split_list(required(params, 0)?, ','),
                })
            }

            fn write_params(&self, w: &mut MessageWriter) {
                w.trailing(self.nicknames.join(","));
            }
        }
    };
}

monitor_list_numeric! {
    /// 731 `:nick[,nick...]`
    MonOffline = RPL_MONOFFLINE
}
monitor_list_numeric! {
    /// 732 `:nick[,nick...]`
    MonList = RPL_MONLIST
}

simple_numeric! {
    /// 733 `:End of MONITOR list`
    EndOfMonList = RPL_ENDOFMONLIST { ; text }
}

/// 734 `limit targets :Monitor list is full.`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonListFull {
    pub limit: u32,
    /// The targets that were not added.
    pub targets: Vec<String>,
    pub text: String,
}

impl NumericMessage for MonListFull {
    const CODE: Response = Response::ERR_MONLISTFULL;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(MonListFull {
            limit: number(required(params, 0)?, "limit")?,
            targets: split_list(required(params, 1)?, ','),
            text: text(params, 2),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.limit.to_string())
            .list(&self.targets, ',')
            .trailing(self.text.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_logon_fields() {
        let logon = LogOn::parse(&["bob", "b", "host.b", "1700000000", "logged online"]).unwrap();
        assert_eq!(logon.nickname, "bob");
        assert_eq!(logon.since, 1_700_000_000);
        assert!(NowOff::parse(&["bob", "*", "*", "never"]).is_err());
    }

    #[test]
    fn monitor_online_nicknames() {
        let online = MonOnline::parse(&["alice!a@host.a,bob"]).unwrap();
        assert_eq!(online.nicknames().collect::<Vec<_>>(), vec!["alice", "bob"]);
        assert_eq!(MonOffline::parse(&["carol,dave"]).unwrap().nicknames.len(), 2);
    }

    #[test]
    fn monitor_list_full() {
        let full = MonListFull::parse(&["100", "erin,frank", "Monitor list is full."]).unwrap();
        assert_eq!(full.limit, 100);
        assert_eq!(full.targets, vec!["erin", "frank"]);
        let mut w = MessageWriter::new();
        full.write_params(&mut w);
        assert_eq!(w.params(), ["100", "erin,frank", "Monitor list is full."]);
    }
}
