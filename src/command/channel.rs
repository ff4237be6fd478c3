//! Channel operations (RFC 2812 section 3.2) and `KNOCK`.

use super::{check_targets, CommandMessage};
use crate::error::{MessageParseError, ModeParseError};
use crate::isupport::ServerSupport;
use crate::message::args::{optional, required, split_list};
use crate::message::MessageWriter;
use crate::mode::{parse_channel_modes, parse_user_modes, ChannelMode, Mode, UserMode};
use crate::validation::{validate_channel_name, validate_nickname, validate_text, ValidationError};

/// Channel prefixes assumed when no server capabilities are at hand.
const COMMON_CHANNEL_TYPES: &str = "#&+!";

fn looks_like_channel(name: &str) -> bool {
    name.starts_with(|c: char| COMMON_CHANNEL_TYPES.contains(c))
}

fn check_channel(name: &str, support: &ServerSupport) -> Result<(), ValidationError> {
    validate_channel_name(name, support.channel_types(), support.max_channel_length())
}

fn check_length(text: &str, max: Option<usize>) -> Result<(), ValidationError> {
    validate_text(text, max)
}

/// `JOIN channels [keys]`, or `JOIN 0` to leave every channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Join {
    pub channels: Vec<String>,
    pub keys: Vec<String>,
}

impl Join {
    pub fn new(channel: impl Into<String>) -> Self {
        Join {
            channels: vec![channel.into()],
            keys: Vec::new(),
        }
    }

    pub fn with_key(channel: impl Into<String>, key: impl Into<String>) -> Self {
        Join {
            channels: vec![channel.into()],
            keys: vec![key.into()],
        }
    }

    /// `JOIN 0`
    pub fn leave_all() -> Self {
        Join::new("0")
    }

    pub fn is_leave_all(&self) -> bool {
        self.channels.len() == 1 && self.channels[0] == "0"
    }
}

impl CommandMessage for Join {
    const KEYWORD: &'static str = "JOIN";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Join {
            channels: split_list(required(params, 0)?, ','),
            keys: params.get(1).map(|k| split_list(k, ',')).unwrap_or_default(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.list(&self.channels, ',').list(&self.keys, ',');
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if self.is_leave_all() {
            return Ok(());
        }
        check_targets("JOIN", self.channels.len(), support)?;
        for channel in &self.channels {
            check_channel(channel, support)?;
        }
        if self.keys.len() > self.channels.len() {
            return Err(ValidationError::TooManyTargets {
                command: "JOIN",
                max: self.channels.len(),
                actual: self.keys.len(),
            });
        }
        Ok(())
    }
}

/// `PART channels [:message]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub channels: Vec<String>,
    pub message: Option<String>,
}

impl Part {
    pub fn new(channel: impl Into<String>) -> Self {
        Part {
            channels: vec![channel.into()],
            message: None,
        }
    }
}

impl CommandMessage for Part {
    const KEYWORD: &'static str = "PART";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Part {
            channels: split_list(required(params, 0)?, ','),
            message: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.list(&self.channels, ',');
        if let Some(message) = &self.message {
            w.trailing(message.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        check_targets("PART", self.channels.len(), support)?;
        for channel in &self.channels {
            check_channel(channel, support)?;
        }
        match &self.message {
            Some(message) => validate_text(message, None),
            None => Ok(()),
        }
    }
}

/// Channel `MODE channel [modes [args...]]`.
///
/// The mode string is kept as sent; decoding it needs the server's mode
/// grammar, see [`modes`](Self::modes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelModeChange {
    pub channel: String,
    /// `None` queries the current modes.
    pub modes: Option<String>,
    pub args: Vec<String>,
}

impl ChannelModeChange {
    pub fn query(channel: impl Into<String>) -> Self {
        ChannelModeChange {
            channel: channel.into(),
            modes: None,
            args: Vec::new(),
        }
    }

    /// Decode the mode string using the server's grammar.
    pub fn modes(&self, support: &ServerSupport) -> Result<Vec<Mode<ChannelMode>>, ModeParseError> {
        match &self.modes {
            Some(modes) => parse_channel_modes(modes, &self.args, support),
            None => Ok(Vec::new()),
        }
    }
}

impl CommandMessage for ChannelModeChange {
    const KEYWORD: &'static str = "MODE";

    fn accepts(params: &[&str]) -> bool {
        params.first().map_or(false, |target| looks_like_channel(target))
    }

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(ChannelModeChange {
            channel: required(params, 0)?.to_string(),
            modes: optional(params, 1),
            args: params.iter().skip(2).map(|s| s.to_string()).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str()).opt_param(self.modes.as_deref());
        for arg in &self.args {
            w.param(arg.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        check_channel(&self.channel, support)?;
        let modes = self.modes(support).map_err(ValidationError::Mode)?;
        let with_args = modes.iter().filter(|m| m.arg().is_some()).count();
        match support.max_modes() {
            Some(max) if with_args > max => Err(ValidationError::TooManyModes {
                max,
                actual: with_args,
            }),
            _ => Ok(()),
        }
    }
}

/// User `MODE nickname [modes [args...]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserModeChange {
    pub nickname: String,
    pub modes: Option<String>,
    pub args: Vec<String>,
}

impl UserModeChange {
    pub fn modes(&self) -> Result<Vec<Mode<UserMode>>, ModeParseError> {
        match &self.modes {
            Some(modes) => parse_user_modes(modes, &self.args),
            None => Ok(Vec::new()),
        }
    }
}

impl CommandMessage for UserModeChange {
    const KEYWORD: &'static str = "MODE";

    fn accepts(params: &[&str]) -> bool {
        params.first().map_or(false, |target| !looks_like_channel(target))
    }

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(UserModeChange {
            nickname: required(params, 0)?.to_string(),
            modes: optional(params, 1),
            args: params.iter().skip(2).map(|s| s.to_string()).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.nickname.as_str()).opt_param(self.modes.as_deref());
        for arg in &self.args {
            w.param(arg.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        validate_nickname(&self.nickname, support.max_nick_length())?;
        self.modes().map(|_| ()).map_err(ValidationError::Mode)
    }
}

/// `TOPIC channel [:topic]`. An empty topic clears it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topic {
    pub channel: String,
    pub topic: Option<String>,
}

impl CommandMessage for Topic {
    const KEYWORD: &'static str = "TOPIC";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Topic {
            channel: required(params, 0)?.to_string(),
            topic: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str());
        if let Some(topic) = &self.topic {
            w.trailing(topic.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        check_channel(&self.channel, support)?;
        match &self.topic {
            Some(topic) => check_length(topic, support.max_topic_length()),
            None => Ok(()),
        }
    }
}

/// `NAMES [channels [target]]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Names {
    pub channels: Vec<String>,
    pub target: Option<String>,
}

impl CommandMessage for Names {
    const KEYWORD: &'static str = "NAMES";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Names {
            channels: params.first().map(|c| split_list(c, ',')).unwrap_or_default(),
            target: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.list(&self.channels, ',');
        if !self.channels.is_empty() {
            w.opt_param(self.target.as_deref());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if !self.channels.is_empty() {
            check_targets("NAMES", self.channels.len(), support)?;
        }
        self.channels.iter().try_for_each(|c| check_channel(c, support))
    }
}

/// `LIST [channels [target]]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct List {
    pub channels: Vec<String>,
    pub target: Option<String>,
}

impl CommandMessage for List {
    const KEYWORD: &'static str = "LIST";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(List {
            channels: params.first().map(|c| split_list(c, ',')).unwrap_or_default(),
            target: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.list(&self.channels, ',');
        if !self.channels.is_empty() {
            w.opt_param(self.target.as_deref());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if !self.channels.is_empty() {
            check_targets("LIST", self.channels.len(), support)?;
        }
        Ok(())
    }
}

/// `INVITE nickname channel`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invite {
    pub nickname: String,
    pub channel: String,
}

impl CommandMessage for Invite {
    const KEYWORD: &'static str = "INVITE";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Invite {
            nickname: required(params, 0)?.to_string(),
            channel: required(params, 1)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.nickname.as_str()).param(self.channel.as_str());
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        validate_nickname(&self.nickname, support.max_nick_length())?;
        check_channel(&self.channel, support)
    }
}

/// `KICK channel users [:comment]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Kick {
    pub channel: String,
    pub users: Vec<String>,
    pub comment: Option<String>,
}

impl CommandMessage for Kick {
    const KEYWORD: &'static str = "KICK";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Kick {
            channel: required(params, 0)?.to_string(),
            users: split_list(required(params, 1)?, ','),
            comment: optional(params, 2),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str()).list(&self.users, ',');
        if let Some(comment) = &self.comment {
            w.trailing(comment.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        check_channel(&self.channel, support)?;
        check_targets("KICK", self.users.len(), support)?;
        match &self.comment {
            Some(comment) => check_length(comment, support.max_kick_length()),
            None => Ok(()),
        }
    }
}

/// `KNOCK channel [:message]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Knock {
    pub channel: String,
    pub message: Option<String>,
}

impl CommandMessage for Knock {
    const KEYWORD: &'static str = "KNOCK";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Knock {
            channel: required(params, 0)?.to_string(),
            message: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str());
        if let Some(message) = &self.message {
            w.trailing(message.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        if !support.supports("KNOCK") {
            return Err(ValidationError::Unsupported("KNOCK"));
        }
        check_channel(&self.channel, support)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_lists_and_leave_all() {
        let join = Join::parse(&["#a,#b", "key"]).unwrap();
        assert_eq!(join.channels, vec!["#a", "#b"]);
        assert_eq!(join.keys, vec!["key"]);
        assert!(Join::parse(&["0"]).unwrap().is_leave_all());

        let support = ServerSupport::default();
        assert!(join.validate(&support).is_ok());
        assert!(Join::leave_all().validate(&support).is_ok());
        assert!(Join::new("nochan").validate(&support).is_err());
    }

    #[test]
    fn mode_routing_by_target() {
        assert!(ChannelModeChange::accepts(&["#chan", "+o", "bob"]));
        assert!(!ChannelModeChange::accepts(&["bob", "+i"]));
        assert!(UserModeChange::accepts(&["bob", "+i"]));
        assert!(!UserModeChange::accepts(&[]));
    }

    #[test]
    fn channel_mode_validation_counts_parameters() {
        let support = ServerSupport::default();
        let change = ChannelModeChange::parse(&["#c", "+oooo", "a", "b", "c", "d"]).unwrap();
        assert_eq!(
            change.validate(&support),
            Err(ValidationError::TooManyModes { max: 3, actual: 4 })
        );
        let change = ChannelModeChange::parse(&["#c", "+k"]).unwrap();
        assert_eq!(
            change.validate(&support),
            Err(ValidationError::Mode(ModeParseError::MissingArgument { mode: 'k' }))
        );
        assert!(ChannelModeChange::query("#c").validate(&support).is_ok());
    }

    #[test]
    fn topic_length() {
        let mut support = ServerSupport::default();
        support.load([("TOPICLEN", Some("5"))]);
        let topic = Topic {
            channel: "#c".into(),
            topic: Some("too long".into()),
        };
        assert!(topic.validate(&support).is_err());
    }

    #[test]
    fn knock_requires_support() {
        let knock = Knock::parse(&["#c"]).unwrap();
        let mut support = ServerSupport::default();
        assert_eq!(knock.validate(&support), Err(ValidationError::Unsupported("KNOCK")));
        support.load([("KNOCK", None)]);
        assert!(knock.validate(&support).is_ok());
    }
}
