//! User queries and the presence-list commands (WATCH, MONITOR, ISON).

use super::{check_targets, CommandMessage};
use crate::error::MessageParseError;
use crate::isupport::ServerSupport;
use crate::message::args::{number, optional, required, split_list};
use crate::message::MessageWriter;
use crate::validation::{validate_nickname, ValidationError};

/// `WHO [mask [o]]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Who {
    pub mask: Option<String>,
    pub operators_only: bool,
}

impl CommandMessage for Who {
    const KEYWORD: &'static str = "WHO";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Who {
            mask: optional(params, 0),
            operators_only: params.get(1).map_or(false, |flag| *flag == "o"),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        if let Some(mask) = &self.mask {
            w.param(mask.as_str());
            if self.operators_only {
                w.param("o");
            }
        }
    }
}

/// `WHOIS [target] masks`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Whois {
    pub target: Option<String>,
    pub masks: Vec<String>,
}

impl Whois {
    pub fn new(nickname: impl Into<String>) -> Self {
        Whois {
            target: None,
            masks: vec![nickname.into()],
        }
    }
}

impl CommandMessage for Whois {
    const KEYWORD: &'static str = "WHOIS";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        match params {
            [] => Err(MessageParseError::arity(1, 0)),
            [masks] => Ok(Whois {
                target: None,
                masks: split_list(masks, ','),
            }),
            [target, masks, ..] => Ok(Whois {
                target: Some(target.to_string()),
                masks: split_list(masks, ','),
            }),
        }
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.opt_param(self.target.as_deref()).list(&self.masks, ',');
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        check_targets("WHOIS", self.masks.len(), support)
    }
}

/// `WHOWAS nicknames [count [target]]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Whowas {
    pub nicknames: Vec<String>,
    pub count: Option<u32>,
    pub target: Option<String>,
}

impl CommandMessage for Whowas {
    const KEYWORD: &'static str = "WHOWAS";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Whowas {
            nicknames: split_list(required(params, 0)?, ','),
            count: params.get(1).map(|c| number(c, "count")).transpose()?,
            target: optional(params, 2),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.list(&self.nicknames, ',');
        if let Some(count) = self.count {
            w.param(count.to_string()).opt_param(self.target.as_deref());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        check_targets("WHOWAS", self.nicknames.len(), support)
    }
}

/// `USERHOST nick [nick...]`, at most five nicknames.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Userhost {
    pub nicknames: Vec<String>,
}

impl Userhost {
    pub const MAX_NICKNAMES: usize = 5;
}

impl CommandMessage for Userhost {
    const KEYWORD: &'static str = "USERHOST";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        required(params, 0)?;
        Ok(Userhost {
            nicknames: params.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        for nick in &self.nicknames {
            w.param(nick.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if self.nicknames.is_empty() {
            return Err(ValidationError::Empty);
        }
        if self.nicknames.len() > Self::MAX_NICKNAMES {
            return Err(ValidationError::TooManyTargets {
                command: "USERHOST",
                max: Self::MAX_NICKNAMES,
                actual: self.nicknames.len(),
            });
        }
        self.nicknames
            .iter()
            .try_for_each(|n| validate_nickname(n, support.max_nick_length()))
    }
}

/// `ISON nick [nick...]`, the bulk online check used for polling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ison {
    pub nicknames: Vec<String>,
}

impl Ison {
    pub fn new<I, S>(nicknames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ison {
            nicknames: nicknames.into_iter().map(Into::into).collect(),
        }
    }
}

impl CommandMessage for Ison {
    const KEYWORD: &'static str = "ISON";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        required(params, 0)?;
        Ok(Ison {
            nicknames: params
                .iter()
                .flat_map(|p| p.split(' '))
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        for nick in &self.nicknames {
            w.param(nick.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if self.nicknames.is_empty() {
            return Err(ValidationError::Empty);
        }
        self.nicknames
            .iter()
            .try_for_each(|n| validate_nickname(n, support.max_nick_length()))
    }
}

/// One token of a WATCH command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEntry {
    /// `+nick`
    Add(String),
    /// `-nick`
    Remove(String),
    /// `C`, clear the list.
    Clear,
    /// `L`, list entries and their status.
    List,
    /// `l`, list entries only.
    ListOnline,
    /// `S`, show status.
    Status,
}

impl WatchEntry {
    fn parse(token: &str) -> Result<Self, MessageParseError> {
        if let Some(nick) = token.strip_prefix('+') {
            return Ok(WatchEntry::Add(nick.to_string()));
        }
        if let Some(nick) = token.strip_prefix('-') {
            return Ok(WatchEntry::Remove(nick.to_string()));
        }
        match token {
            "C" | "c" => Ok(WatchEntry::Clear),
            "L" => Ok(WatchEntry::List),
            "l" => Ok(WatchEntry::ListOnline),
            "S" | "s" => Ok(WatchEntry::Status),
            other => Err(MessageParseError::InvalidArgument(format!(
                "unknown WATCH token {:?}",
                other
            ))),
        }
    }

    fn to_token(&self) -> String {
        match self {
            WatchEntry::Add(nick) => format!("+{}", nick),
            WatchEntry::Remove(nick) => format!("-{}", nick),
            WatchEntry::Clear => "C".to_string(),
            WatchEntry::List => "L".to_string(),
            WatchEntry::ListOnline => "l".to_string(),
            WatchEntry::Status => "S".to_string(),
        }
    }
}

/// `WATCH [+nick|-nick|C|L|l|S ...]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Watch {
    pub entries: Vec<WatchEntry>,
}

impl CommandMessage for Watch {
    const KEYWORD: &'static str = "WATCH";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        let entries = params
            .iter()
            .flat_map(|p| p.split(' '))
            .filter(|t| !t.is_empty())
            .map(WatchEntry::parse)
            .collect::<Result<_, _>>()?;
        Ok(Watch { entries })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        for entry in &self.entries {
            w.param(entry.to_token());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if support.max_watches() == 0 {
            return Err(ValidationError::Unsupported("WATCH"));
        }
        let added = self
            .entries
            .iter()
            .filter(|e| matches!(e, WatchEntry::Add(_)))
            .count();
        if added > support.max_watches() {
            return Err(ValidationError::TooManyTargets {
                command: "WATCH",
                max: support.max_watches(),
                actual: added,
            });
        }
        Ok(())
    }
}

/// The sub-command of a MONITOR line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorAction {
    Add,
    Remove,
    Clear,
    List,
    Status,
}

impl MonitorAction {
    pub fn as_str(self) -> &'static str {
        match self {
            MonitorAction::Add => "+",
            MonitorAction::Remove => "-",
            MonitorAction::Clear => "C",
            MonitorAction::List => "L",
            MonitorAction::Status => "S",
        }
    }

    /// Whether this action carries a target list.
    pub fn takes_targets(self) -> bool {
        matches!(self, MonitorAction::Add | MonitorAction::Remove)
    }
}

/// `MONITOR + targets`, `MONITOR - targets`, `MONITOR C|L|S`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Monitor {
    pub action: MonitorAction,
    pub targets: Vec<String>,
}

impl Monitor {
    pub fn add<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Monitor {
            action: MonitorAction::Add,
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remove<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Monitor {
            action: MonitorAction::Remove,
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }
}

impl CommandMessage for Monitor {
    const KEYWORD: &'static str = "MONITOR";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        let action = match required(params, 0)? {
            "+" => MonitorAction::Add,
            "-" => MonitorAction::Remove,
            "C" | "c" => MonitorAction::Clear,
            "L" | "l" => MonitorAction::List,
            "S" | "s" => MonitorAction::Status,
            other => {
                return Err(MessageParseError::InvalidArgument(format!(
                    "unknown MONITOR action {:?}",
                    other
                )))
            }
        };
        let targets = if action.takes_targets() {
            split_list(required(params, 1)?, ',')
        } else {
            Vec::new()
        };
        Ok(Monitor { action, targets })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.action.as_str());
        if self.action.takes_targets() {
            w.list(&self.targets, ',');
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if support.max_monitors() == 0 {
            return Err(ValidationError::Unsupported("MONITOR"));
        }
        if self.action.takes_targets() && self.targets.is_empty() {
            return Err(ValidationError::Empty);
        }
        if self.action == MonitorAction::Add && self.targets.len() > support.max_monitors() {
            return Err(ValidationError::TooManyTargets {
                command: "MONITOR",
                max: support.max_monitors(),
                actual: self.targets.len(),
            });
        }
        Ok(())
    }
}

/// `SILENCE [+mask|-mask ...]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Silence {
    pub masks: Vec<String>,
}

impl CommandMessage for Silence {
    const KEYWORD: &'static str = "SILENCE";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Silence {
            masks: params.iter().flat_map(|p| split_list(p, ',')).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.list(&self.masks, ',');
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if support.max_silence() == 0 {
            return Err(ValidationError::Unsupported("SILENCE"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_tokens() {
        let watch = Watch::parse(&["+alice", "-bob", "C", "l"]).unwrap();
        assert_eq!(
            watch.entries,
            vec![
                WatchEntry::Add("alice".into()),
                WatchEntry::Remove("bob".into()),
                WatchEntry::Clear,
                WatchEntry::ListOnline,
            ]
        );
        assert!(Watch::parse(&["?"]).is_err());

        let mut w = MessageWriter::new();
        watch.write_params(&mut w);
        assert_eq!(w.params(), ["+alice", "-bob", "C", "l"]);
    }

    #[test]
    fn watch_requires_server_support() {
        let watch = Watch {
            entries: vec![WatchEntry::Add("alice".into())],
        };
        let mut support = ServerSupport::default();
        assert_eq!(watch.validate(&support), Err(ValidationError::Unsupported("WATCH")));
        support.load([("WATCH", Some("128"))]);
        assert!(watch.validate(&support).is_ok());
    }

    #[test]
    fn monitor_actions() {
        let m = Monitor::parse(&["+", "a,b"]).unwrap();
        assert_eq!(m, Monitor::add(["a", "b"]));
        let m = Monitor::parse(&["L"]).unwrap();
        assert_eq!(m.action, MonitorAction::List);
        assert!(m.targets.is_empty());
        assert!(Monitor::parse(&["+"]).is_err());
        assert!(Monitor::parse(&["X"]).is_err());
    }

    #[test]
    fn ison_accepts_trailing_list() {
        let ison = Ison::parse(&["alice bob", "carol"]).unwrap();
        assert_eq!(ison.nicknames, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn userhost_limit() {
        let support = ServerSupport::default();
        let uh = Userhost::parse(&["a", "b", "c", "d", "e", "f"]).unwrap();
        assert!(matches!(
            uh.validate(&support),
            Err(ValidationError::TooManyTargets { max: 5, .. })
        ));
    }

    #[test]
    fn whois_forms() {
        assert_eq!(Whois::parse(&["bob"]).unwrap(), Whois::new("bob"));
        let w = Whois::parse(&["irc.a", "bob,carol"]).unwrap();
        assert_eq!(w.target.as_deref(), Some("irc.a"));
        assert_eq!(w.masks.len(), 2);
    }
}
