//! Messaging commands (RFC 2812 section 3.3) plus AWAY, WALLOPS and KILL.

use super::{check_targets, CommandMessage};
use crate::error::MessageParseError;
use crate::isupport::ServerSupport;
use crate::message::args::{optional, required, split_list};
use crate::message::MessageWriter;
use crate::validation::{validate_nickname, validate_text, ValidationError};

fn check_message_targets(
    command: &'static str,
    targets: &[String],
    support: &ServerSupport,
) -> Result<(), ValidationError> {
    check_targets(command, targets.len(), support)?;
    for target in targets {
        if target.is_empty() {
            return Err(ValidationError::Empty);
        }
        if let Some((position, ch)) = target
            .char_indices()
            .find(|(_, c)| *c == ' ' || c.is_control())
        {
            return Err(ValidationError::InvalidChar { ch, position });
        }
    }
    Ok(())
}

macro_rules! text_message {
    ($(#[$doc:meta])* $name:ident, $keyword:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub targets: Vec<String>,
            pub text: String,
        }

        impl $name {
            pub fn new(target: impl Into<String>, text: impl Into<String>) -> Self {
                $name {
                    targets: vec![target.into()],
                    text: text.into(),
                }
            }
        }

        impl CommandMessage for $name {
            const KEYWORD: &'static str = $keyword;

            fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
                Ok($name {
                    targets: split_list(required(params, 0)?, ','),
                    text: required(params, 1)?.to_string(),
                })
            }

            fn write_params(&self, w: &mut MessageWriter) {
                w.list(&self.targets, ',').trailing(self.text.as_str());
            }

            fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
                check_message_targets($keyword, &self.targets, support)?;
                validate_text(&self.text, None)
            }
        }
    };
}

text_message! {
    /// `PRIVMSG targets :text`
    Privmsg, "PRIVMSG"
}

text_message! {
    /// `NOTICE targets :text`. Clients must never reply to a notice
    /// automatically.
    Notice, "NOTICE"
}

/// `WALLOPS :text`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallops {
    pub text: String,
}

impl CommandMessage for Wallops {
    const KEYWORD: &'static str = "WALLOPS";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Wallops {
            text: required(params, 0)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.trailing(self.text.as_str());
    }

    fn validate(&self, _support: &ServerSupport) -> Result<(), ValidationError> {
        validate_text(&self.text, None)
    }
}

/// `AWAY [:message]`. Without a message the user is marked present again.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Away {
    pub message: Option<String>,
}

impl CommandMessage for Away {
    const KEYWORD: &'static str = "AWAY";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Away {
            message: optional(params, 0).filter(|m| !m.is_empty()),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        if let Some(message) = &self.message {
            w.trailing(message.as_str());
        }
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        match &self.message {
            Some(message) => validate_text(message, support.max_away_length()),
            None => Ok(()),
        }
    }
}

/// `KILL nickname :comment`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Kill {
    pub nickname: String,
    pub comment: String,
}

impl CommandMessage for Kill {
    const KEYWORD: &'static str = "KILL";

    fn parse(params: &[&str]) -> Result<Self, MessageParseError> {
        Ok(Kill {
            nickname: required(params, 0)?.to_string(),
            comment: required(params, 1)?.to_string(),
        })
    }

    fn write_params(&self, w: &mut MessageWriter) {
        w.param(self.nickname.as_str()).trailing(self.comment.as_str());
    }

    fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
        validate_nickname(&self.nickname, support.max_nick_length())?;
        validate_text(&self.comment, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privmsg_multiple_targets() {
        let msg = Privmsg::parse(&["#a,bob", "hello there"]).unwrap();
        assert_eq!(msg.targets, vec!["#a", "bob"]);
        assert_eq!(msg.text, "hello there");
        assert!(Privmsg::parse(&["#a"]).is_err());
    }

    #[test]
    fn privmsg_validation() {
        let mut support = ServerSupport::default();
        support.load([("TARGMAX", Some("PRIVMSG:1"))]);
        let msg = Privmsg::parse(&["#a,bob", "hi"]).unwrap();
        assert!(matches!(
            msg.validate(&support),
            Err(ValidationError::TooManyTargets { max: 1, actual: 2, .. })
        ));
        assert!(Privmsg::new("#a", "hi\nQUIT").validate(&support).is_err());
        assert!(Notice::new("bob", "fine").validate(&support).is_ok());
    }

    #[test]
    fn away_empty_means_back() {
        assert_eq!(Away::parse(&[""]).unwrap(), Away { message: None });
        assert_eq!(Away::parse(&[]).unwrap(), Away { message: None });
        let mut support = ServerSupport::default();
        support.load([("AWAYLEN", Some("4"))]);
        let away = Away {
            message: Some("lunch break".into()),
        };
        assert!(away.validate(&support).is_err());
    }
}
