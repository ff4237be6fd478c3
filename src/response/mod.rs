//! IRC numeric replies.
//!
//! [`Response`] names the three-digit codes. Each code the library decodes
//! has a struct implementing [`NumericMessage`]; the [`Reply`] enum, the
//! [`NumericConduit`] callbacks and the [`NUMERIC_TYPES`] registry are
//! generated from one list. Codes without a struct land in
//! [`Reply::GenericReply`] or [`Reply::GenericError`].
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol
//! - Modern IRC documentation: <https://modern.ircdocs.horse/>

#![allow(non_camel_case_types)]

use std::fmt;
use std::marker::PhantomData;

use crate::dispatch::{MessageType, NumericType};
use crate::error::MessageParseError;
use crate::message::{Conduit, Message, MessageWriter};

/// Declares a numeric whose leading parameters are plain strings and whose
/// last parameter is free text.
macro_rules! simple_numeric {
    ($(#[$doc:meta])* $name:ident = $code:ident { $($field:ident),* ; $trail:ident }) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            $( pub $field: String, )*
            pub $trail: String,
        }

        impl $crate::response::NumericMessage for $name {
            const CODE: $crate::response::Response = $crate::response::Response::$code;

            #[allow(unused_mut, unused_assignments)]
            fn parse(params: &[&str]) -> Result<Self, $crate::error::MessageParseError> {
                let mut index = 0;
                $(
                    let $field = $crate::message::args::required(params, index)?.to_string();
                    index += 1;
                )*
                Ok($name {
                    $( $field, )*
                    $trail: $crate::message::args::text(params, index),
                })
            }

            fn write_params(&self, w: &mut $crate::message::MessageWriter) {
                $( w.param(self.$field.as_str()); )*
                w.trailing(self.$trail.as_str());
            }
        }
    };
}

mod channel;
mod errors;
mod helpers;
mod presence;
mod registration;
mod user;

pub use self::channel::{
    BanList, ChannelModeIs, CreationTime, EndOfBanList, EndOfExceptList, EndOfInviteList,
    EndOfNames, ExceptList, InviteList, Inviting, ListEnd, ListReply, ListStart, NamesReply,
    NoTopic, TopicReply, TopicWhoTime,
};
pub use self::errors::{
    AlreadyRegistered, BadChannelKey, BannedFromChan, CannotSendToChan, ChanOpPrivsNeeded,
    ChannelIsFull, ErroneousNickname, InviteOnlyChan, NeedMoreParams, NicknameInUse,
    NoMotd, NoNicknameGiven, NoPrivileges, NoSuchChannel, NoSuchNick, NoSuchServer,
    NotOnChannel, NotRegistered, PasswdMismatch, TooManyChannels, UmodeUnknownFlag,
    UnknownCommand, UnknownMode, UserNotInChannel, UserOnChannel, UsersDontMatch,
    WasNoSuchNick,
};
pub use self::helpers::{is_error_code, ParseResponseError};
pub use self::presence::{
    EndOfMonList, EndOfWatchList, LogOff, LogOn, MonList, MonListFull, MonOffline, MonOnline,
    NowOff, NowOn, TooManyWatch, WatchListReply, WatchOff, WatchStat,
};
pub use self::registration::{
    Created, EndOfMotd, HostHidden, LuserChannels, LuserClient, LuserMe, LuserOp, LuserUnknown,
    MotdLine, MotdStart, MyInfo, SupportReply, TimeReply, UModeIs, VersionReply, Welcome,
    YoureOper, YourHost,
};
pub use self::user::{
    AwayReply, EndOfWho, EndOfWhois, EndOfWhowas, IsonReply, NowAway, UnAway, UserhostEntry,
    UserhostReply, WhoReply, WhoisChannels, WhoisIdle, WhoisOperator, WhoisServer, WhoisUser,
    WhowasUser,
};

macro_rules! response_codes {
    ($( $(#[$doc:meta])* $name:ident = $code:literal, )*) => {
        /// IRC server response code.
        ///
        /// Response codes are categorized as:
        /// - 001-099: Connection/registration
        /// - 200-399: Command replies
        /// - 400-599: Error replies
        /// - 600-999: Extended numerics (WATCH, MONITOR)
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        #[non_exhaustive]
        pub enum Response {
            $( $(#[$doc])* $name = $code, )*
        }

        impl Response {
            /// Creates a Response from a numeric code
            pub fn from_code(code: u16) -> Option<Response> {
                match code {
                    $( $code => Some(Response::$name), )*
                    _ => None,
                }
            }
        }
    };
}

response_codes! {
    // === Connection Registration (001-099) ===
    /// 001 - Welcome to the IRC network
    RPL_WELCOME = 1,
    /// 002 - Your host is running version
    RPL_YOURHOST = 2,
    /// 003 - Server creation date
    RPL_CREATED = 3,
    /// 004 - Server info (name, version, user modes, channel modes)
    RPL_MYINFO = 4,
    /// 005 - Server supported features (ISUPPORT)
    RPL_ISUPPORT = 5,

    // === Command Responses (200-399) ===
    /// 221 - User mode string
    RPL_UMODEIS = 221,
    /// 251 - Luser client count
    RPL_LUSERCLIENT = 251,
    /// 252 - Luser operator count
    RPL_LUSEROP = 252,
    /// 253 - Luser unknown connections
    RPL_LUSERUNKNOWN = 253,
    /// 254 - Luser channel count
    RPL_LUSERCHANNELS = 254,
    /// 255 - Luser local info
    RPL_LUSERME = 255,
    /// 301 - User is away
    RPL_AWAY = 301,
    /// 302 - USERHOST reply
    RPL_USERHOST = 302,
    /// 303 - ISON reply
    RPL_ISON = 303,
    /// 305 - No longer away
    RPL_UNAWAY = 305,
    /// 306 - Now away
    RPL_NOWAWAY = 306,
    /// 311 - WHOIS user info
    RPL_WHOISUSER = 311,
    /// 312 - WHOIS server info
    RPL_WHOISSERVER = 312,
    /// 313 - WHOIS operator status
    RPL_WHOISOPERATOR = 313,
    /// 314 - WHOWAS user info
    RPL_WHOWASUSER = 314,
    /// 315 - End of WHO
    RPL_ENDOFWHO = 315,
    /// 317 - WHOIS idle time
    RPL_WHOISIDLE = 317,
    /// 318 - End of WHOIS
    RPL_ENDOFWHOIS = 318,
    /// 319 - WHOIS channels
    RPL_WHOISCHANNELS = 319,
    /// 321 - LIST start
    RPL_LISTSTART = 321,
    /// 322 - LIST entry
    RPL_LIST = 322,
    /// 323 - End of LIST
    RPL_LISTEND = 323,
    /// 324 - Channel mode
    RPL_CHANNELMODEIS = 324,
    /// 329 - Channel creation time
    RPL_CREATIONTIME = 329,
    /// 331 - No topic set
    RPL_NOTOPIC = 331,
    /// 332 - Channel topic
    RPL_TOPIC = 332,
    /// 333 - Topic set by/time
    RPL_TOPICWHOTIME = 333,
    /// 341 - Inviting user to channel
    RPL_INVITING = 341,
    /// 346 - Invite exception list entry
    RPL_INVITELIST = 346,
    /// 347 - End of invite exception list
    RPL_ENDOFINVITELIST = 347,
    /// 348 - Ban exception list entry
    RPL_EXCEPTLIST = 348,
    /// 349 - End of ban exception list
    RPL_ENDOFEXCEPTLIST = 349,
    /// 351 - Server version
    RPL_VERSION = 351,
    /// 352 - WHO reply
    RPL_WHOREPLY = 352,
    /// 353 - NAMES reply
    RPL_NAMREPLY = 353,
    /// 366 - End of NAMES
    RPL_ENDOFNAMES = 366,
    /// 367 - Ban list entry
    RPL_BANLIST = 367,
    /// 368 - End of ban list
    RPL_ENDOFBANLIST = 368,
    /// 369 - End of WHOWAS
    RPL_ENDOFWHOWAS = 369,
    /// 372 - MOTD line
    RPL_MOTD = 372,
    /// 375 - MOTD start
    RPL_MOTDSTART = 375,
    /// 376 - End of MOTD
    RPL_ENDOFMOTD = 376,
    /// 381 - You are now an IRC operator
    RPL_YOUREOPER = 381,
    /// 391 - Server time
    RPL_TIME = 391,
    /// 396 - Displayed host changed
    RPL_HOSTHIDDEN = 396,

    // === Error Replies (400-599) ===
    /// 401 - No such nick/channel
    ERR_NOSUCHNICK = 401,
    /// 402 - No such server
    ERR_NOSUCHSERVER = 402,
    /// 403 - No such channel
    ERR_NOSUCHCHANNEL = 403,
    /// 404 - Cannot send to channel
    ERR_CANNOTSENDTOCHAN = 404,
    /// 405 - Too many channels joined
    ERR_TOOMANYCHANNELS = 405,
    /// 406 - There was no such nickname
    ERR_WASNOSUCHNICK = 406,
    /// 421 - Unknown command
    ERR_UNKNOWNCOMMAND = 421,
    /// 422 - MOTD file missing
    ERR_NOMOTD = 422,
    /// 431 - No nickname given
    ERR_NONICKNAMEGIVEN = 431,
    /// 432 - Erroneous nickname
    ERR_ERRONEOUSNICKNAME = 432,
    /// 433 - Nickname in use
    ERR_NICKNAMEINUSE = 433,
    /// 441 - User not in channel
    ERR_USERNOTINCHANNEL = 441,
    /// 442 - You're not on that channel
    ERR_NOTONCHANNEL = 442,
    /// 443 - User already on channel
    ERR_USERONCHANNEL = 443,
    /// 451 - You have not registered
    ERR_NOTREGISTERED = 451,
    /// 461 - Not enough parameters
    ERR_NEEDMOREPARAMS = 461,
    /// 462 - Already registered
    ERR_ALREADYREGISTERED = 462,
    /// 464 - Password incorrect
    ERR_PASSWDMISMATCH = 464,
    /// 471 - Channel is full
    ERR_CHANNELISFULL = 471,
    /// 472 - Unknown mode character
    ERR_UNKNOWNMODE = 472,
    /// 473 - Invite-only channel
    ERR_INVITEONLYCHAN = 473,
    /// 474 - Banned from channel
    ERR_BANNEDFROMCHAN = 474,
    /// 475 - Bad channel key
    ERR_BADCHANNELKEY = 475,
    /// 481 - Permission denied
    ERR_NOPRIVILEGES = 481,
    /// 482 - Channel operator privileges needed
    ERR_CHANOPRIVSNEEDED = 482,
    /// 501 - Unknown user mode flag
    ERR_UMODEUNKNOWNFLAG = 501,
    /// 502 - Cannot change mode for other users
    ERR_USERSDONTMATCH = 502,
    /// 512 - WATCH list is full
    ERR_TOOMANYWATCH = 512,

    // === WATCH (600-607) ===
    /// 600 - Watched user logged on
    RPL_LOGON = 600,
    /// 601 - Watched user logged off
    RPL_LOGOFF = 601,
    /// 602 - Stopped watching
    RPL_WATCHOFF = 602,
    /// 603 - WATCH statistics
    RPL_WATCHSTAT = 603,
    /// 604 - Watched user is online
    RPL_NOWON = 604,
    /// 605 - Watched user is offline
    RPL_NOWOFF = 605,
    /// 606 - WATCH list entries
    RPL_WATCHLIST = 606,
    /// 607 - End of WATCH list
    RPL_ENDOFWATCHLIST = 607,

    // === MONITOR (730-734) ===
    /// 730 - Monitored targets online
    RPL_MONONLINE = 730,
    /// 731 - Monitored targets offline
    RPL_MONOFFLINE = 731,
    /// 732 - MONITOR list entries
    RPL_MONLIST = 732,
    /// 733 - End of MONITOR list
    RPL_ENDOFMONLIST = 733,
    /// 734 - MONITOR list is full
    ERR_MONLISTFULL = 734,
}

/// A numeric reply type. The envelope owns the leading target parameter;
/// `parse` sees only what follows it.
pub trait NumericMessage: Sized + Clone + fmt::Debug + PartialEq + Into<Reply> {
    const CODE: Response;

    fn parse(params: &[&str]) -> Result<Self, MessageParseError>;

    fn write_params(&self, w: &mut MessageWriter);
}

/// A numeric no registered type claimed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericNumeric {
    pub code: u16,
    /// Parameters after the target.
    pub params: Vec<String>,
    /// Whether the last parameter was sent with a leading `:`.
    pub trailing: bool,
}

impl GenericNumeric {
    /// Wrap as a success or error reply according to the code class.
    pub fn into_reply(self) -> Reply {
        if is_error_code(self.code) {
            Reply::GenericError(self)
        } else {
            Reply::GenericReply(self)
        }
    }

    fn write_params(&self, w: &mut MessageWriter) {
        let Some((last, middle)) = self.params.split_last() else {
            return;
        };
        for param in middle {
            w.param(param.as_str());
        }
        if self.trailing {
            w.trailing(last.as_str());
        } else {
            w.param(last.as_str());
        }
    }
}

macro_rules! reply_family {
    ($( $variant:ident($ty:ident) => $callback:ident, )*) => {
        /// Every numeric reply.
        #[derive(Clone, Debug, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum Reply {
            $( $variant($ty), )*
            /// An unrecognised success numeric.
            GenericReply(GenericNumeric),
            /// An unrecognised error numeric.
            GenericError(GenericNumeric),
        }

        $(
            impl From<$ty> for Reply {
                fn from(reply: $ty) -> Self {
                    Reply::$variant(reply)
                }
            }
        )*

        impl Reply {
            /// The three-digit code.
            pub fn code(&self) -> u16 {
                match self {
                    $( Reply::$variant(_) => <$ty as NumericMessage>::CODE.code(), )*
                    Reply::GenericReply(g) | Reply::GenericError(g) => g.code,
                }
            }

            pub fn write_params(&self, w: &mut MessageWriter) {
                match self {
                    $( Reply::$variant(r) => r.write_params(w), )*
                    Reply::GenericReply(g) | Reply::GenericError(g) => g.write_params(w),
                }
            }

            pub(crate) fn notify(&self, message: &Message, conduit: &mut dyn Conduit) {
                match self {
                    $( Reply::$variant(r) => conduit.$callback(message, r), )*
                    Reply::GenericReply(g) => conduit.on_generic_reply(message, g),
                    Reply::GenericError(g) => conduit.on_generic_error(message, g),
                }
            }
        }

        /// Callbacks for numeric replies. Every method defaults to a no-op.
        #[allow(unused_variables)]
        pub trait NumericConduit {
            $( fn $callback(&mut self, message: &Message, reply: &$ty) {} )*
            fn on_generic_reply(&mut self, message: &Message, reply: &GenericNumeric) {}
            fn on_generic_error(&mut self, message: &Message, reply: &GenericNumeric) {}
        }

        /// The built-in numeric types, in initial dispatch order.
        pub static NUMERIC_TYPES: &[&dyn MessageType] = &[
            $( &NumericType::<$ty>(PhantomData), )*
        ];
    };
}

reply_family! {
    Welcome(Welcome) => on_welcome,
    YourHost(YourHost) => on_your_host,
    Created(Created) => on_created,
    MyInfo(MyInfo) => on_my_info,
    Support(SupportReply) => on_support,
    UModeIs(UModeIs) => on_umode_is,
    LuserClient(LuserClient) => on_luser_client,
    LuserOp(LuserOp) => on_luser_op,
    LuserUnknown(LuserUnknown) => on_luser_unknown,
    LuserChannels(LuserChannels) => on_luser_channels,
    LuserMe(LuserMe) => on_luser_me,
    MotdStart(MotdStart) => on_motd_start,
    MotdLine(MotdLine) => on_motd_line,
    EndOfMotd(EndOfMotd) => on_end_of_motd,
    YoureOper(YoureOper) => on_youre_oper,
    Version(VersionReply) => on_version_reply,
    Time(TimeReply) => on_time_reply,
    HostHidden(HostHidden) => on_host_hidden,
    Away(AwayReply) => on_away_reply,
    Userhost(UserhostReply) => on_userhost_reply,
    Ison(IsonReply) => on_ison_reply,
    UnAway(UnAway) => on_unaway,
    NowAway(NowAway) => on_now_away,
    WhoisUser(WhoisUser) => on_whois_user,
    WhoisServer(WhoisServer) => on_whois_server,
    WhoisOperator(WhoisOperator) => on_whois_operator,
    WhowasUser(WhowasUser) => on_whowas_user,
    EndOfWho(EndOfWho) => on_end_of_who,
    WhoisIdle(WhoisIdle) => on_whois_idle,
    EndOfWhois(EndOfWhois) => on_end_of_whois,
    WhoisChannels(WhoisChannels) => on_whois_channels,
    EndOfWhowas(EndOfWhowas) => on_end_of_whowas,
    Who(WhoReply) => on_who_reply,
    ListStart(ListStart) => on_list_start,
    List(ListReply) => on_list_reply,
    ListEnd(ListEnd) => on_list_end,
    ChannelModeIs(ChannelModeIs) => on_channel_mode_is,
    CreationTime(CreationTime) => on_creation_time,
    NoTopic(NoTopic) => on_no_topic,
    Topic(TopicReply) => on_topic_reply,
    TopicWhoTime(TopicWhoTime) => on_topic_who_time,
    Inviting(Inviting) => on_inviting,
    Names(NamesReply) => on_names_reply,
    EndOfNames(EndOfNames) => on_end_of_names,
    BanList(BanList) => on_ban_list,
    EndOfBanList(EndOfBanList) => on_end_of_ban_list,
    ExceptList(ExceptList) => on_except_list,
    EndOfExceptList(EndOfExceptList) => on_end_of_except_list,
    InviteList(InviteList) => on_invite_list,
    EndOfInviteList(EndOfInviteList) => on_end_of_invite_list,
    LogOn(LogOn) => on_log_on,
    LogOff(LogOff) => on_log_off,
    WatchOff(WatchOff) => on_watch_off,
    WatchStat(WatchStat) => on_watch_stat,
    NowOn(NowOn) => on_now_on,
    NowOff(NowOff) => on_now_off,
    WatchList(WatchListReply) => on_watch_list,
    EndOfWatchList(EndOfWatchList) => on_end_of_watch_list,
    TooManyWatch(TooManyWatch) => on_too_many_watch,
    MonOnline(MonOnline) => on_mon_online,
    MonOffline(MonOffline) => on_mon_offline,
    MonList(MonList) => on_mon_list,
    EndOfMonList(EndOfMonList) => on_end_of_mon_list,
    MonListFull(MonListFull) => on_mon_list_full,
    NoSuchNick(NoSuchNick) => on_no_such_nick,
    NoSuchServer(NoSuchServer) => on_no_such_server,
    NoSuchChannel(NoSuchChannel) => on_no_such_channel,
    CannotSendToChan(CannotSendToChan) => on_cannot_send_to_chan,
    TooManyChannels(TooManyChannels) => on_too_many_channels,
    WasNoSuchNick(WasNoSuchNick) => on_was_no_such_nick,
    UnknownCommand(UnknownCommand) => on_unknown_command,
    NoMotd(NoMotd) => on_no_motd,
    NoNicknameGiven(NoNicknameGiven) => on_no_nickname_given,
    ErroneousNickname(ErroneousNickname) => on_erroneous_nickname,
    NicknameInUse(NicknameInUse) => on_nickname_in_use,
    UserNotInChannel(UserNotInChannel) => on_user_not_in_channel,
    NotOnChannel(NotOnChannel) => on_not_on_channel,
    UserOnChannel(UserOnChannel) => on_user_on_channel,
    NotRegistered(NotRegistered) => on_not_registered,
    NeedMoreParams(NeedMoreParams) => on_need_more_params,
    AlreadyRegistered(AlreadyRegistered) => on_already_registered,
    PasswdMismatch(PasswdMismatch) => on_passwd_mismatch,
    ChannelIsFull(ChannelIsFull) => on_channel_is_full,
    UnknownMode(UnknownMode) => on_unknown_mode,
    InviteOnlyChan(InviteOnlyChan) => on_invite_only_chan,
    BannedFromChan(BannedFromChan) => on_banned_from_chan,
    BadChannelKey(BadChannelKey) => on_bad_channel_key,
    NoPrivileges(NoPrivileges) => on_no_privileges,
    ChanOpPrivsNeeded(ChanOpPrivsNeeded) => on_chan_op_privs_needed,
    UmodeUnknownFlag(UmodeUnknownFlag) => on_umode_unknown_flag,
    UsersDontMatch(UsersDontMatch) => on_users_dont_match,
}

impl Reply {
    /// The named code, if the library knows it.
    pub fn response(&self) -> Option<Response> {
        Response::from_code(self.code())
    }

    /// Whether the code denotes an error.
    pub fn is_error(&self) -> bool {
        is_error_code(self.code())
    }
}
