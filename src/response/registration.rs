//! Registration burst, LUSERS, MOTD and server information numerics.

use super::{NumericMessage, Response};
use crate::error::MessageParseError;
use crate::message::args::{number, required, text};
use crate::message::MessageWriter;

simple_numeric! {
    /// 001 `:Welcome to the network, nick`
    Welcome = RPL_WELCOME { ; text }
}
simple_numeric! {
    /// 002 `:Your host is ...`
    YourHost = RPL_YOURHOST { ; text }
}
simple_numeric! {
    /// 003 `:This server was created ...`
    Created = RPL_CREATED { ; text }
}

/// 004 `servername version usermodes chanmodes [chanmodes-with-params]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MyInfo {
    pub server: String,
    pub version: String,
    pub user_modes: String,
    pub channel_modes: String,
    pub extra: Vec<String>,
}

impl NumericMessage for MyInfo {
    const CODE: Response = Response::RPL_MYINFO;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(MyInfo {
            server: required(params, 0)?.to_string(),
            version: required(params, 1)?.to_string(),
            user_modes: required(params, 2)?.to_string(),
            channel_modes: required(params, 3)?.to_string(),
            extra: params[4..].iter().map(|s| s.to_string()).collect(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.server.as_str())
            .param(self.version.as_str())
            .param(self.user_modes.as_str())
            .param(self.channel_modes.as_str())
            .params_from(&self.extra);
    }
}

/// 005 `TOKEN[=value] ... :are supported by this server`
///
/// The last parameter is human text whenever more than one parameter is
/// present. See [`crate::isupport::Isupport::from_reply`] for the token
/// view and [`crate::ServerSupport::load_message`] to apply it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportReply {
    pub tokens: Vec<String>,
    pub text: String,
}

impl NumericMessage for SupportReply {
    const CODE: Response = Response::RPL_ISUPPORT;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        match params {
            [] => Err(MessageParseError::arity(1, 0)),
            [only] if only.contains(' ') => Ok(SupportReply {
                tokens: Vec::new(),
                text: only.to_string(),
            }),
            [only] => Ok(SupportReply {
                tokens: vec![only.to_string()],
                text: String::new(),
            }),
            [tokens @ .., last] => Ok(SupportReply {
                tokens: tokens.iter().map(|s| s.to_string()).collect(),
                text: last.to_string(),
            }),
        }
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.params_from(&self.tokens);
        if !self.text.is_empty() {
            w.trailing(self.text.as_str());
        }
    }
}

/// 221 `modes`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UModeIs {
    pub modes: String,
}

impl NumericMessage for UModeIs {
    const CODE: Response = Response::RPL_UMODEIS;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(UModeIs {
            modes: required(params, 0)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.modes.as_str());
    }
}

simple_numeric! {
    /// 251 `:There are N users and M invisible on S servers`
    LuserClient = RPL_LUSERCLIENT { ; text }
}

macro_rules! count_numeric {
    ($(#[$doc:meta])* $name:ident = $code:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub count: u32,
            pub text: String,
        }

        impl NumericMessage for $name {
            const CODE: Response = Response::$code;

            fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
                Ok($name {
                    count: number(required(params, 0)?, "count")?,
                    text: text(params, 1),
                })
            }

            fn write_params(&self, w: &mut MessageWriter) {
                w.param(self.count.to_string()).trailing(self.text.as_str());
            }
        }
    };
}

count_numeric! {
    /// 252 `count :operator(s) online`
    LuserOp = RPL_LUSEROP
}
count_numeric! {
    /// 253 `count :unknown connection(s)`
    LuserUnknown = RPL_LUSERUNKNOWN
}
count_numeric! {
    /// 254 `count :channels formed`
    LuserChannels = RPL_LUSERCHANNELS
}

simple_numeric! {
    /// 255 `:I have N clients and M servers`
    LuserMe = RPL_LUSERME { ; text }
}
simple_numeric! {
    /// 375 `:- server Message of the day -`
    MotdStart = RPL_MOTDSTART { ; text }
}
simple_numeric! {
    /// 372 `:- text`
    MotdLine = RPL_MOTD { ; text }
}
simple_numeric! {
    /// 376 `:End of MOTD command`
    EndOfMotd = RPL_ENDOFMOTD { ; text }
}
simple_numeric! {
    /// 381 `:You are now an IRC operator`
    YoureOper = RPL_YOUREOPER { ; text }
}
simple_numeric! {
    /// 351 `version server :comments`
    VersionReply = RPL_VERSION { version, server ; comments }
}
simple_numeric! {
    /// 391 `server :time string`
    TimeReply = RPL_TIME { server ; time }
}
simple_numeric! {
    /// 396 `host :is now your displayed host`
    HostHidden = RPL_HOSTHIDDEN { host ; text }
}
