//! Channel and user modes.
//!
//! Well-known channel letters know their own arity. Whether any other
//! letter takes an argument is server specific, so decoding a channel mode
//! string needs the [`ServerSupport`](crate::ServerSupport) advertised in
//! `CHANMODES` and `PREFIX`. User modes never take arguments.

use std::fmt;

use crate::isupport::ModeClass;

mod parse;
mod serialize;

pub use self::parse::{parse_channel_modes, parse_user_modes};
pub use self::serialize::{apply_to, chunk_modes, serialize_modes};

/// A mode letter type.
pub trait ModeType: fmt::Debug + Clone + PartialEq {
    fn from_char(c: char) -> Self;

    fn as_char(&self) -> char;
}

/// Channel modes with a well-known meaning. Anything else is `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelMode {
    /// `b`
    Ban,
    /// `e`
    Exception,
    /// `I`
    InviteException,
    /// `q` as a list mode
    Quiet,
    /// `k`
    Key,
    /// `l`
    Limit,
    /// `q` as a membership prefix
    Founder,
    /// `a` as a membership prefix
    Admin,
    /// `o`
    Oper,
    /// `h`
    Halfop,
    /// `v`
    Voice,
    /// `i`
    InviteOnly,
    /// `m`
    Moderated,
    /// `n`
    NoExternalMessages,
    /// `p`
    Private,
    /// `s`
    Secret,
    /// `t`
    ProtectedTopic,
    /// `R`
    RegisteredOnly,
    Unknown(char),
}

impl ChannelMode {
    /// The meaning of a letter the server lists in `PREFIX`.
    ///
    /// `q` and `a` are list or flag modes on some networks and membership
    /// prefixes on others.
    pub fn prefix(c: char) -> ChannelMode {
        match c {
            'q' => ChannelMode::Founder,
            'a' => ChannelMode::Admin,
            'o' => ChannelMode::Oper,
            'h' => ChannelMode::Halfop,
            'v' => ChannelMode::Voice,
            c => ChannelMode::Unknown(c),
        }
    }

    /// How this letter consumes arguments regardless of what the server
    /// advertises. `None` for letters outside the known table.
    pub fn class(&self) -> Option<ModeClass> {
        use self::ChannelMode::*;

        match self {
            Ban | Exception | InviteException | Quiet => Some(ModeClass::List),
            Key => Some(ModeClass::Parameter),
            Limit => Some(ModeClass::ParameterWhenSet),
            Founder | Admin | Oper | Halfop | Voice => Some(ModeClass::Prefix),
            InviteOnly | Moderated | NoExternalMessages | Private | Secret | ProtectedTopic
            | RegisteredOnly => Some(ModeClass::NoParameter),
            Unknown(_) => None,
        }
    }

    pub fn is_membership(&self) -> bool {
        matches!(
            self,
            ChannelMode::Founder
                | ChannelMode::Admin
                | ChannelMode::Oper
                | ChannelMode::Halfop
                | ChannelMode::Voice
        )
    }
}

impl ModeType for ChannelMode {
    fn from_char(c: char) -> ChannelMode {
        use self::ChannelMode::*;

        match c {
            'b' => Ban,
            'e' => Exception,
            'I' => InviteException,
            'q' => Quiet,
            'k' => Key,
            'l' => Limit,
            'o' => Oper,
            'h' => Halfop,
            'v' => Voice,
            'i' => InviteOnly,
            'm' => Moderated,
            'n' => NoExternalMessages,
            'p' => Private,
            's' => Secret,
            't' => ProtectedTopic,
            'R' => RegisteredOnly,
            c => Unknown(c),
        }
    }

    fn as_char(&self) -> char {
        use self::ChannelMode::*;

        match *self {
            Ban => 'b',
            Exception => 'e',
            InviteException => 'I',
            Quiet | Founder => 'q',
            Key => 'k',
            Limit => 'l',
            Admin => 'a',
            Oper => 'o',
            Halfop => 'h',
            Voice => 'v',
            InviteOnly => 'i',
            Moderated => 'm',
            NoExternalMessages => 'n',
            Private => 'p',
            Secret => 's',
            ProtectedTopic => 't',
            RegisteredOnly => 'R',
            Unknown(c) => c,
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// User modes with a well-known meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UserMode {
    /// `a`
    Away,
    /// `i`
    Invisible,
    /// `w`
    Wallops,
    /// `r`
    Restricted,
    /// `o`
    Oper,
    /// `O`
    LocalOper,
    /// `s`
    ServerNotices,
    /// `x`
    MaskedHost,
    Unknown(char),
}

impl ModeType for UserMode {
    fn from_char(c: char) -> UserMode {
        use self::UserMode::*;

        match c {
            'a' => Away,
            'i' => Invisible,
            'w' => Wallops,
            'r' => Restricted,
            'o' => Oper,
            'O' => LocalOper,
            's' => ServerNotices,
            'x' => MaskedHost,
            c => Unknown(c),
        }
    }

    fn as_char(&self) -> char {
        use self::UserMode::*;

        match *self {
            Away => 'a',
            Invisible => 'i',
            Wallops => 'w',
            Restricted => 'r',
            Oper => 'o',
            LocalOper => 'O',
            ServerNotices => 's',
            MaskedHost => 'x',
            Unknown(c) => c,
        }
    }
}

impl fmt::Display for UserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One mode change: a letter, its direction and its argument if any.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode<T> {
    Plus(T, Option<String>),
    Minus(T, Option<String>),
}

impl<T: ModeType> Mode<T> {
    pub fn plus(mode: T, arg: Option<&str>) -> Mode<T> {
        Mode::Plus(mode, arg.map(str::to_string))
    }

    pub fn minus(mode: T, arg: Option<&str>) -> Mode<T> {
        Mode::Minus(mode, arg.map(str::to_string))
    }

    pub fn mode(&self) -> &T {
        match self {
            Mode::Plus(mode, _) | Mode::Minus(mode, _) => mode,
        }
    }

    pub fn arg(&self) -> Option<&str> {
        match self {
            Mode::Plus(_, arg) | Mode::Minus(_, arg) => arg.as_deref(),
        }
    }

    pub fn is_plus(&self) -> bool {
        matches!(self, Mode::Plus(..))
    }

    fn sign(&self) -> char {
        if self.is_plus() {
            '+'
        } else {
            '-'
        }
    }
}

impl<T: ModeType> fmt::Display for Mode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.sign(), self.mode().as_char())?;
        if let Some(arg) = self.arg() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_letters_map_both_ways() {
        for c in "beIqklohvimnpstR".chars() {
            assert_eq!(ChannelMode::from_char(c).as_char(), c);
        }
        assert_eq!(ChannelMode::from_char('Z'), ChannelMode::Unknown('Z'));
        assert_eq!(ChannelMode::prefix('q'), ChannelMode::Founder);
        assert_eq!(ChannelMode::Founder.as_char(), 'q');
        assert!(ChannelMode::Voice.is_membership());
    }

    #[test]
    fn known_letters_carry_their_class() {
        assert_eq!(ChannelMode::Exception.class(), Some(ModeClass::List));
        assert_eq!(ChannelMode::Key.class(), Some(ModeClass::Parameter));
        assert_eq!(ChannelMode::Limit.class(), Some(ModeClass::ParameterWhenSet));
        assert_eq!(ChannelMode::Halfop.class(), Some(ModeClass::Prefix));
        assert_eq!(ChannelMode::Secret.class(), Some(ModeClass::NoParameter));
        assert_eq!(ChannelMode::Unknown('f').class(), None);
    }

    #[test]
    fn user_letters_map_both_ways() {
        for c in "aiwroOsx".chars() {
            assert_eq!(UserMode::from_char(c).as_char(), c);
        }
    }

    #[test]
    fn display() {
        assert_eq!(Mode::plus(ChannelMode::Oper, Some("bob")).to_string(), "+o bob");
        assert_eq!(Mode::minus(UserMode::Invisible, None).to_string(), "-i");
    }
}
