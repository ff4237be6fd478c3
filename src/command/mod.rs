//! Command-style messages: those identified by a textual keyword.
//!
//! Every keyword the library understands has its own struct implementing
//! [`CommandMessage`]. The [`Command`] enum, the [`CommandConduit`] callback
//! trait and the [`COMMAND_TYPES`] registry are generated from one list so
//! they cannot drift apart.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - WATCH, MONITOR and SILENCE as documented at <https://modern.ircdocs.horse/>

mod channel;
mod connection;
mod messaging;
mod raw;
mod server;
mod user;

use std::fmt;
use std::marker::PhantomData;

pub use self::channel::{
    ChannelModeChange, Invite, Join, Kick, Knock, List, Names, Part, Topic, UserModeChange,
};
pub use self::connection::{Error, Nick, Oper, Pass, Ping, Pong, Quit, User};
pub use self::messaging::{Away, Kill, Notice, Privmsg, Wallops};
pub use self::raw::RawCommand;
pub use self::server::{Admin, Info, Links, Lusers, Motd, Stats, Time, Trace, Version};
pub use self::user::{
    Ison, Monitor, MonitorAction, Silence, Userhost, Watch, WatchEntry, Who, Whois, Whowas,
};

use crate::dispatch::{CommandType, MessageType};
use crate::error::MessageParseError;
use crate::isupport::ServerSupport;
use crate::message::{Body, Conduit, Message, MessageWriter};
use crate::validation::ValidationError;

/// A message identified by a textual keyword.
pub trait CommandMessage: Sized + Clone + fmt::Debug + PartialEq + Into<Command> {
    /// The wire keyword, in canonical upper case.
    const KEYWORD: &'static str;

    /// Narrow a shared keyword (channel vs. user `MODE`). Only consulted after
    /// the keyword matched.
    fn accepts(_params: &[&str]) -> bool {
        true
    }

    /// Build the message from its parameters.
    fn parse(params: &[&str]) -> Result<Self, MessageParseError>;

    /// Push parameters in wire order.
    fn write_params(&self, w: &mut MessageWriter);

    /// Check the message against the server's advertised limits.
    fn validate(&self, _support: &ServerSupport) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Fail validation when more targets are given than the server accepts.
pub(crate) fn check_targets(
    command: &'static str,
    count: usize,
    support: &ServerSupport,
) -> Result<(), ValidationError> {
    if count == 0 {
        return Err(ValidationError::Empty);
    }
    match support.max_targets(command) {
        Some(max) if count > max => Err(ValidationError::TooManyTargets {
            command,
            max,
            actual: count,
        }),
        _ => Ok(()),
    }
}

macro_rules! command_family {
    ($( $variant:ident($ty:ident) => $callback:ident, )*) => {
        /// Every command-style message.
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum Command {
            $( $variant($ty), )*
            /// A keyword no registered type claimed, kept verbatim.
            Raw(RawCommand),
        }

        $(
            impl From<$ty> for Command {
                fn from(command: $ty) -> Self {
                    Command::$variant(command)
                }
            }

            impl From<$ty> for Body {
                fn from(command: $ty) -> Self {
                    Body::Command(Command::$variant(command))
                }
            }
        )*

        impl Command {
            /// The wire keyword.
            pub fn keyword(&self) -> &str {
                match self {
                    $( Command::$variant(_) => <$ty as CommandMessage>::KEYWORD, )*
                    Command::Raw(raw) => &raw.keyword,
                }
            }

            pub fn write_params(&self, w: &mut MessageWriter) {
                match self {
                    $( Command::$variant(c) => c.write_params(w), )*
                    Command::Raw(raw) => raw.write_params(w),
                }
            }

            pub fn validate(&self, support: &ServerSupport) -> Result<(), ValidationError> {
                match self {
                    $( Command::$variant(c) => c.validate(support), )*
                    Command::Raw(_) => Ok(()),
                }
            }

            pub(crate) fn notify(&self, message: &Message, conduit: &mut dyn Conduit) {
                match self {
                    $( Command::$variant(c) => conduit.$callback(message, c), )*
                    Command::Raw(raw) => conduit.on_raw_command(message, raw),
                }
            }
        }

        /// Callbacks for command-style messages. Every method defaults to a
        /// no-op.
        #[allow(unused_variables)]
        pub trait CommandConduit {
            $( fn $callback(&mut self, message: &Message, command: &$ty) {} )*
            fn on_raw_command(&mut self, message: &Message, command: &RawCommand) {}
        }

        /// The built-in command types, in initial dispatch order.
        pub static COMMAND_TYPES: &[&dyn MessageType] = &[
            $( &CommandType::<$ty>(PhantomData), )*
        ];
    };
}

command_family! {
    Privmsg(Privmsg) => on_privmsg,
    Notice(Notice) => on_notice,
    Ping(Ping) => on_ping,
    Pong(Pong) => on_pong,
    Join(Join) => on_join,
    Part(Part) => on_part,
    Quit(Quit) => on_quit,
    Nick(Nick) => on_nick,
    ChannelMode(ChannelModeChange) => on_channel_mode,
    UserMode(UserModeChange) => on_user_mode,
    Topic(Topic) => on_topic,
    Kick(Kick) => on_kick,
    Invite(Invite) => on_invite,
    Error(Error) => on_error,
    Pass(Pass) => on_pass,
    User(User) => on_user,
    Oper(Oper) => on_oper,
    Names(Names) => on_names,
    List(List) => on_list,
    Knock(Knock) => on_knock,
    Away(Away) => on_away,
    Wallops(Wallops) => on_wallops,
    Kill(Kill) => on_kill,
    Motd(Motd) => on_motd,
    Lusers(Lusers) => on_lusers,
    Version(Version) => on_version,
    Stats(Stats) => on_stats,
    Links(Links) => on_links,
    Time(Time) => on_time,
    Trace(Trace) => on_trace,
    Admin(Admin) => on_admin,
    Info(Info) => on_info,
    Who(Who) => on_who,
    Whois(Whois) => on_whois,
    Whowas(Whowas) => on_whowas,
    Userhost(Userhost) => on_userhost,
    Ison(Ison) => on_ison,
    Watch(Watch) => on_watch,
    Monitor(Monitor) => on_monitor,
    Silence(Silence) => on_silence,
}

impl From<RawCommand> for Command {
    fn from(raw: RawCommand) -> Self {
        Command::Raw(raw)
    }
}

impl From<Command> for Body {
    fn from(command: Command) -> Self {
        Body::Command(command)
    }
}

impl From<RawCommand> for Body {
    fn from(raw: RawCommand) -> Self {
        Body::Command(Command::Raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_every_variant() {
        assert_eq!(COMMAND_TYPES.len(), 40);
        let mut names: Vec<_> = COMMAND_TYPES.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 40);
    }

    #[test]
    fn keyword_of_each_family_member() {
        let c: Command = Privmsg::new("#a", "hi").into();
        assert_eq!(c.keyword(), "PRIVMSG");
        let c: Command = RawCommand::new("FOO", vec!["bar".into()], false).into();
        assert_eq!(c.keyword(), "FOO");
    }

    #[test]
    fn target_limits() {
        let mut support = ServerSupport::default();
        support.load([("TARGMAX", Some("PRIVMSG:2"))]);
        assert!(check_targets("PRIVMSG", 2, &support).is_ok());
        assert_eq!(
            check_targets("PRIVMSG", 3, &support),
            Err(ValidationError::TooManyTargets {
                command: "PRIVMSG",
                max: 2,
                actual: 3
            })
        );
        assert_eq!(check_targets("JOIN", 0, &support), Err(ValidationError::Empty));
    }
}
