//! Channel numerics: LIST, topic, NAMES, mode state and the mask lists.

use super::{NumericMessage, Response};
use crate::error::{MessageParseError, ModeParseError};
use crate::isupport::ServerSupport;
use crate::message::args::{number, required, text};
use crate::message::MessageWriter;
use crate::mode::{parse_channel_modes, ChannelMode, Mode};

/// 321 `Channel :Users  Name`. The column headings vary between servers and
/// are kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ListStart {
    pub columns: Vec<String>,
}

impl NumericMessage for ListStart {
    const CODE: Response = Response::RPL_LISTSTART;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(ListStart {
            columns: params.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        if let Some((last, middle)) = self.columns.split_last() {
            w.params_from(middle).trailing(last.as_str());
        }
    }
}

/// 322 `channel visible :topic`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListReply {
    pub channel: String,
    pub visible: u32,
    pub topic: String,
}

impl NumericMessage for ListReply {
    const CODE: Response = Response::RPL_LIST;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(ListReply {
            channel: required(params, 0)?.to_string(),
            visible: number(required(params, 1)?, "visible")?,
            topic: text(params, 2),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str())
            .param(self.visible.to_string())
            .trailing(self.topic.as_str());
    }
}

simple_numeric! {
    /// 323 `:End of LIST`
    ListEnd = RPL_LISTEND { ; text }
}

/// 324 `channel modes [args...]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelModeIs {
    pub channel: String,
    pub modes: String,
    pub args: Vec<String>,
}

impl ChannelModeIs {
    /// Decode the mode string against the server's mode classes.
    pub fn modes(&self, support: &ServerSupport) -> Result<Vec<Mode<ChannelMode>>, ModeParseError> {
        parse_channel_modes(&self.modes, &self.args, support)
    }
}

impl NumericMessage for ChannelModeIs {
    const CODE: Response = Response::RPL_CHANNELMODEIS;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(ChannelModeIs {
            channel: required(params, 0)?.to_string(),
            modes: required(params, 1)?.to_string(),
            args: params[2..].iter().map(|s| s.to_string()).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str())
            .param(self.modes.as_str())
            .params_from(&self.args);
    }
}

/// 329 `channel timestamp`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreationTime {
    pub channel: String,
    pub created: i64,
}

impl NumericMessage for CreationTime {
    const CODE: Response = Response::RPL_CREATIONTIME;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(CreationTime {
            channel: required(params, 0)?.to_string(),
            created: number(required(params, 1)?, "timestamp")?,
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str()).param(self.created.to_string());
    }
}

simple_numeric! {
    /// 331 `channel :No topic is set`
    NoTopic = RPL_NOTOPIC { channel ; text }
}
simple_numeric! {
    /// 332 `channel :topic`
    TopicReply = RPL_TOPIC { channel ; topic }
}

/// 333 `channel setter timestamp`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicWhoTime {
    pub channel: String,
    /// A nickname or full `nick!user@host` mask, depending on the server.
    pub setter: String,
    pub set_at: i64,
}

impl NumericMessage for TopicWhoTime {
    const CODE: Response = Response::RPL_TOPICWHOTIME;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(TopicWhoTime {
            channel: required(params, 0)?.to_string(),
            setter: required(params, 1)?.to_string(),
            set_at: number(required(params, 2)?, "timestamp")?,
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.channel.as_str())
            .param(self.setter.as_str())
            .param(self.set_at.to_string());
    }
}

/// 341 `nick channel`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inviting {
    pub nickname: String,
    pub channel: String,
}

impl NumericMessage for Inviting {
    const CODE: Response = Response::RPL_INVITING;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Inviting {
            nickname: required(params, 0)?.to_string(),
            channel: required(params, 1)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.nickname.as_str()).param(self.channel.as_str());
    }
}

/// 353 `(=|*|@) channel :[prefix]nick ...`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamesReply {
    /// `=` public, `*` private, `@` secret.
    pub visibility: char,
    pub channel: String,
    /// Names as sent, prefix symbols included.
    pub names: Vec<String>,
}

impl NamesReply {
    /// Split each name into its membership symbols and the bare nickname.
    /// Handles several stacked symbols.
    pub fn members<'a>(&'a self, support: &ServerSupport) -> Vec<(&'a str, &'a str)> {
        let symbols = support.prefix_symbols();
        self.names
            .iter()
            .map(|name| {
                let split = name
                    .char_indices()
                    .find(|(_, c)| !symbols.contains(*c))
                    .map(|(i, _)| i)
                    .unwrap_or(name.len());
                name.split_at(split)
            })
            .collect()
    }
}

impl NumericMessage for NamesReply {
    const CODE: Response = Response::RPL_NAMREPLY;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        // Older servers omit the visibility marker.
        let (visibility, rest) = match params {
            [marker, rest @ ..] if rest.len() >= 2 && marker.chars().count() == 1 => {
                (marker.chars().next().unwrap_or('='), rest)
            }
            _ => ('=', params),
        };
        Ok(NamesReply {
            visibility,
            channel: required(rest, 0)?.to_string(),
            names: text(rest, 1).split_whitespace().map(str::to_string).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.visibility.to_string())
            .param(self.channel.as_str())
            .trailing(self.names.join(" "));
    }
}

simple_numeric! {
    /// 366 `channel :End of NAMES list`
    EndOfNames = RPL_ENDOFNAMES { channel ; text }
}

macro_rules! mask_list_numeric {
    ($(#[$doc:meta])* $name:ident = $code:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub channel: String,
            pub mask: String,
            pub setter: Option<String>,
            pub set_at: Option<i64>,
        }

        impl NumericMessage for $name {
            const CODE: Response = Response::$code;

            fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
                Ok($name {
                    channel: required(params, 0)?.to_string(),
                    mask: required(params, 1)?.to_string(),
                    setter: params.get(2).map(|s| s.to_string()),
                    set_at: params.get(3).map(|t| number(t, "timestamp")).transpose()?,
                })
            }

            fn write_params(&self, w: &mut MessageWriter) {
                w.param(self.channel.as_str()).param(self.mask.as_str());
                if let Some(setter) = &self.setter {
                    w.param(setter.as_str());
                    if let Some(at) = self.set_at {
                        w.param(at.to_string());
                    }
                }
            }
        }
    };
}

mask_list_numeric! {
    /// 367 `channel mask [setter [timestamp]]`
    BanList = RPL_BANLIST
}
mask_list_numeric! {
    /// 348 `channel mask [setter [timestamp]]`
    ExceptList = RPL_EXCEPTLIST
}
mask_list_numeric! {
    /// 346 `channel mask [setter [timestamp]]`
    InviteList = RPL_INVITELIST
}

simple_numeric! {
    /// 368 `channel :End of channel ban list`
    EndOfBanList = RPL_ENDOFBANLIST { channel ; text }
}
simple_numeric! {
    /// 349 `channel :End of channel exception list`
    EndOfExceptList = RPL_ENDOFEXCEPTLIST { channel ; text }
}
simple_numeric! {
    /// 347 `channel :End of channel invite list`
    EndOfInviteList = RPL_ENDOFINVITELIST { channel ; text }
}
