//! Connection registration and keep-alive commands.

use super::CommandMessage;
use crate::error::MessageParseError;
use crate::isupport::ServerSupport;
use crate::message::args::{optional, required};
use crate::message::MessageWriter;
use crate::validation::{validate_nickname, validate_text, ValidationError};

/// `PASS password`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pass {
    pub password: String,
}

impl CommandMessage for Pass {
    const KEYWORD: &'static str = "PASS";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Pass {
            password: required(params, 0)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.password.as_str());
    }

    fn validate(&self, _support: &ServerSupport) -> Result<(), ValidationError> {
        if self.password.is_empty() {
            return Err(ValidationError::Empty);
        }
        validate_text(&self.password, None)
    }
}

/// `NICK nickname`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nick {
    pub nickname: String,
}

impl Nick {
    pub fn new(nickname: impl Into<String>) -> Self {
        Nick {
            nickname: nickname.into(),
        }
    }
}

impl CommandMessage for Nick {
    const KEYWORD: &'static str = "NICK";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Nick::new(required(params, 0)?))
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.nickname.as_str());
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        validate_nickname(&self.nickname, support.max_nick_length())
    }
}

/// `USER username mode * :realname`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
    /// The RFC 2812 mode bitmask (`0`, `8` for invisible); older servers
    /// treat it as a hostname.
    pub mode: String,
    pub realname: String,
}

impl User {
    pub fn new(username: impl Into<String>, realname: impl Into<String>) -> Self {
        User {
            username: username.into(),
            mode: "0".to_string(),
            realname: realname.into(),
        }
    }
}

impl CommandMessage for User {
    const KEYWORD: &'static str = "USER";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(User {
            username: required(params, 0)?.to_string(),
            mode: required(params, 1)?.to_string(),
            realname: required(params, 3)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.username.as_str())
            .param(self.mode.as_str())
            .param("*")
            .trailing(self.realname.as_str());
    }

    fn validate(&self, _support: &ServerSupport) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::Empty);
        }
        if let Some((position, ch)) = self
            .username
            .char_indices()
            .find(|(_, c)| matches!(c, ' ' | '@') || c.is_control())
        {
            return Err(ValidationError::InvalidChar { ch, position });
        }
        validate_text(&self.realname, None)
    }
}

/// `OPER name password`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Oper {
    pub name: String,
    pub password: String,
}

impl CommandMessage for Oper {
    const KEYWORD: &'static str = "OPER";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Oper {
            name: required(params, 0)?.to_string(),
            password: required(params, 1)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.name.as_str()).param(self.password.as_str());
    }
}

/// `QUIT [:message]`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Quit {
    pub message: Option<String>,
}

impl CommandMessage for Quit {
    const KEYWORD: &'static str = "QUIT";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Quit {
            message: optional(params, 0),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        if let Some(message) = &self.message {
            w.trailing(message.as_str());
        }
    }

    fn validate(&self, _support: &ServerSupport) -> Result<(), ValidationError> {
        match &self.message {
            Some(message) => validate_text(message, None),
            None => Ok(()),
        }
    }
}

/// `PING token [server]`
///
/// Servers send `PING :token` and expect the token echoed back in a
/// [`Pong`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ping {
    pub token: String,
    pub server: Option<String>,
}

impl Ping {
    pub fn new(token: impl Into<String>) -> Self {
        Ping {
            token: token.into(),
            server: None,
        }
    }

    /// The reply a client owes for this ping.
    pub fn reply(&self) -> Pong {
        Pong {
            server: self.token.clone(),
            token: None,
        }
    }
}

impl CommandMessage for Ping {
    const KEYWORD: &'static str = "PING";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Ping {
            token: required(params, 0)?.to_string(),
            server: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        match &self.server {
            Some(server) => {
                w.param(self.token.as_str()).param(server.as_str());
            }
            None => {
                w.trailing(self.token.as_str());
            }
        }
    }
}

/// `PONG server [:token]`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pong {
    pub server: String,
    pub token: Option<String>,
}

impl CommandMessage for Pong {
    const KEYWORD: &'static str = "PONG";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Pong {
            server: required(params, 0)?.to_string(),
            token: optional(params, 1),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        match &self.token {
            Some(token) => {
                w.param(self.server.as_str()).trailing(token.as_str());
            }
            None => {
                w.trailing(self.server.as_str());
            }
        }
    }
}

/// `ERROR :message`, sent by the server before it closes the link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub message: String,
}

impl CommandMessage for Error {
    const KEYWORD: &'static str = "ERROR";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Error {
            message: required(params, 0)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.trailing(self.message.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_skips_unused_field() {
        let user = User::parse(&["guest", "0", "*", "Real Name"]).unwrap();
        assert_eq!(user.username, "guest");
        assert_eq!(user.realname, "Real Name");
        assert!(User::parse(&["guest", "0", "*"]).is_err());
    }

    #[test]
    fn ping_reply_echoes_token() {
        let ping = Ping::parse(&["irc.example.net"]).unwrap();
        assert_eq!(ping.reply().server, "irc.example.net");
    }

    #[test]
    fn nick_validation_uses_nicklen() {
        let mut support = ServerSupport::default();
        assert!(Nick::new("averylongnick").validate(&support).is_err());
        support.load([("NICKLEN", Some("30"))]);
        assert!(Nick::new("averylongnick").validate(&support).is_ok());
    }

    #[test]
    fn user_validation() {
        let support = ServerSupport::default();
        assert!(User::new("guest", "Real Name").validate(&support).is_ok());
        assert!(User::new("gu est", "x").validate(&support).is_err());
        assert!(User::new("guest", "line\r\nbreak").validate(&support).is_err());
    }
}
