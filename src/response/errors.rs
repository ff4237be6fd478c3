//! Error numerics (400-599).

simple_numeric! {
    /// 401 `nick :No such nick/channel`
    NoSuchNick = ERR_NOSUCHNICK { nickname ; text }
}
simple_numeric! {
    /// 402 `server :No such server`
    NoSuchServer = ERR_NOSUCHSERVER { server ; text }
}
simple_numeric! {
    /// 403 `channel :No such channel`
    NoSuchChannel = ERR_NOSUCHCHANNEL { channel ; text }
}
simple_numeric! {
    /// 404 `channel :Cannot send to channel`
    CannotSendToChan = ERR_CANNOTSENDTOCHAN { channel ; text }
}
simple_numeric! {
    /// 405 `channel :You have joined too many channels`
    TooManyChannels = ERR_TOOMANYCHANNELS { channel ; text }
}
simple_numeric! {
    /// 406 `nick :There was no such nickname`
    WasNoSuchNick = ERR_WASNOSUCHNICK { nickname ; text }
}
simple_numeric! {
    /// 421 `command :Unknown command`
    UnknownCommand = ERR_UNKNOWNCOMMAND { command ; text }
}
simple_numeric! {
    /// 422 `:MOTD File is missing`
    NoMotd = ERR_NOMOTD { ; text }
}
simple_numeric! {
    /// 431 `:No nickname given`
    NoNicknameGiven = ERR_NONICKNAMEGIVEN { ; text }
}
simple_numeric! {
    /// 432 `nick :Erroneous nickname`
    ErroneousNickname = ERR_ERRONEOUSNICKNAME { nickname ; text }
}
simple_numeric! {
    /// 433 `nick :Nickname is already in use`
    NicknameInUse = ERR_NICKNAMEINUSE { nickname ; text }
}
simple_numeric! {
    /// 441 `nick channel :They aren't on that channel`
    UserNotInChannel = ERR_USERNOTINCHANNEL { nickname, channel ; text }
}
simple_numeric! {
    /// 442 `channel :You're not on that channel`
    NotOnChannel = ERR_NOTONCHANNEL { channel ; text }
}
simple_numeric! {
    /// 443 `nick channel :is already on channel`
    UserOnChannel = ERR_USERONCHANNEL { nickname, channel ; text }
}
simple_numeric! {
    /// 451 `:You have not registered`
    NotRegistered = ERR_NOTREGISTERED { ; text }
}
simple_numeric! {
    /// 461 `command :Not enough parameters`
    NeedMoreParams = ERR_NEEDMOREPARAMS { command ; text }
}
simple_numeric! {
    /// 462 `:You may not reregister`
    AlreadyRegistered = ERR_ALREADYREGISTERED { ; text }
}
simple_numeric! {
    /// 464 `:Password incorrect`
    PasswdMismatch = ERR_PASSWDMISMATCH { ; text }
}
simple_numeric! {
    /// 471 `channel :Cannot join channel (+l)`
    ChannelIsFull = ERR_CHANNELISFULL { channel ; text }
}
simple_numeric! {
    /// 472 `char :is unknown mode char to me`
    UnknownMode = ERR_UNKNOWNMODE { mode ; text }
}
simple_numeric! {
    /// 473 `channel :Cannot join channel (+i)`
    InviteOnlyChan = ERR_INVITEONLYCHAN { channel ; text }
}
simple_numeric! {
    /// 474 `channel :Cannot join channel (+b)`
    BannedFromChan = ERR_BANNEDFROMCHAN { channel ; text }
}
simple_numeric! {
    /// 475 `channel :Cannot join channel (+k)`
    BadChannelKey = ERR_BADCHANNELKEY { channel ; text }
}
simple_numeric! {
    /// 481 `:Permission Denied- You're not an IRC operator`
    NoPrivileges = ERR_NOPRIVILEGES { ; text }
}
simple_numeric! {
    /// 482 `channel :You're not channel operator`
    ChanOpPrivsNeeded = ERR_CHANOPRIVSNEEDED { channel ; text }
}
simple_numeric! {
    /// 501 `:Unknown MODE flag`
    UmodeUnknownFlag = ERR_UMODEUNKNOWNFLAG { ; text }
}
simple_numeric! {
    /// 502 `:Cant change mode for other users`
    UsersDontMatch = ERR_USERSDONTMATCH { ; text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::NumericMessage;

    #[test]
    fn nickname_in_use() {
        let err = NicknameInUse::parse(&["bob", "Nickname is already in use"]).unwrap();
        assert_eq!(err.nickname, "bob");
        assert!(NicknameInUse::parse(&[]).is_err());
    }

    #[test]
    fn missing_text_reads_empty() {
        let err = UserNotInChannel::parse(&["bob", "#rust"]).unwrap();
        assert_eq!(err.channel, "#rust");
        assert_eq!(err.text, "");
    }
}
