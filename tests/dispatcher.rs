//! Dispatcher behaviour across a session: custom types first, candidate
//! ordering, generic fallbacks and parse failures that keep the stream
//! going.

use nebo_irc::command::RawCommand;
use nebo_irc::error::MessageParseError;
use nebo_irc::message::RawLine;
use nebo_irc::{
    Body, CandidateKind, Command, Ctcp, Dispatcher, Message, MessageType, ProtocolError, Reply,
};

/// Turns `!command args` channel messages into `BOT` commands.
struct BotCommand;

impl MessageType for BotCommand {
    fn name(&self) -> &'static str {
        "BotCommand"
    }

    fn can_parse(&self, line: &RawLine<'_>) -> bool {
        line.command.eq_ignore_ascii_case("PRIVMSG")
            && line.params.get(1).map_or(false, |text| text.starts_with('!'))
    }

    fn parse(&self, line: &RawLine<'_>) -> Result<Message, MessageParseError> {
        let text = line.params.get(1).ok_or(MessageParseError::NotEnoughArguments {
            expected: 2,
            got: line.params.len(),
        })?;
        let params = text[1..].split(' ').map(str::to_string).collect();
        Ok(Message {
            prefix: line.sender()?,
            body: Body::Command(Command::Raw(RawCommand::new("BOT", params, false))),
        })
    }
}

#[test]
fn custom_types_win_over_builtins() {
    let mut dispatcher = Dispatcher::new();
    dispatcher.register(Box::new(BotCommand));

    let msg = dispatcher.parse(":a!b@c PRIVMSG #rust :!roll 2d6").unwrap();
    assert_eq!(msg.to_string(), ":a!b@c BOT roll 2d6");

    let plain = dispatcher.parse(":a!b@c PRIVMSG #rust :hello").unwrap();
    assert!(matches!(plain.as_command(), Some(Command::Privmsg(_))));
    assert_eq!(dispatcher.candidate_order(CandidateKind::Custom), vec!["BotCommand"]);
}

#[test]
fn frequent_types_move_forward() {
    let mut dispatcher = Dispatcher::new();
    for line in [":irc.x 372 me :- motd", ":irc.x 376 me :End", ":irc.x 372 me :- more"] {
        dispatcher.parse(line).unwrap();
    }
    let order = dispatcher.candidate_order(CandidateKind::Numeric);
    assert_eq!(&order[..2], &["MotdLine", "EndOfMotd"]);

    dispatcher.parse(":a!b@c PRIVMSG bob :\x01VERSION\x01").unwrap();
    assert_eq!(dispatcher.candidate_order(CandidateKind::Ctcp)[0], "Version");
}

#[test]
fn numeric_classification_beats_keyword_lookup() {
    let mut dispatcher = Dispatcher::new();
    let msg = dispatcher.parse(":irc.x 433 * nebo :Nickname is already in use").unwrap();
    assert!(msg.as_reply().map_or(false, Reply::is_error));
    assert_eq!(msg.keyword(), "433");
}

#[test]
fn ctcp_reply_marker_picks_generic_family() {
    let mut dispatcher = Dispatcher::new();
    let request = dispatcher.parse(":a!b@c PRIVMSG bob :\x01XYZZY plugh\x01").unwrap();
    let reply = dispatcher.parse(":bob!b@d NOTICE a :\x01XYZZY nothing happens\x01").unwrap();
    assert!(matches!(request.as_ctcp().unwrap().ctcp, Ctcp::GenericRequest(_)));
    assert!(matches!(reply.as_ctcp().unwrap().ctcp, Ctcp::GenericReply(_)));
}

#[test]
fn failures_carry_the_raw_text() {
    let mut dispatcher = Dispatcher::new();
    // RPL_NAMREPLY without a channel.
    let err = dispatcher.parse(":irc.x 353 me").unwrap_err();
    assert_eq!(err.raw_text(), Some(":irc.x 353 me"));

    let long = format!("PRIVMSG #a :{}", "y".repeat(520));
    match dispatcher.parse(&long) {
        Err(ProtocolError::InvalidMessage {
            cause: MessageParseError::LineTooLong { limit: 512, .. },
            ..
        }) => {}
        other => panic!("unexpected {:?}", other),
    }

    // The dispatcher is still usable afterwards.
    assert!(dispatcher.parse("PING :still here").is_ok());
}

#[test]
fn exactly_512_characters_is_accepted() {
    let mut dispatcher = Dispatcher::new();
    let prefix = "PRIVMSG #a :";
    let line = format!("{}{}", prefix, "z".repeat(512 - prefix.len()));
    assert_eq!(line.len(), 512);
    assert!(dispatcher.parse(&line).is_ok());
}

#[test]
fn one_character_over_is_refused() {
    let mut dispatcher = Dispatcher::new();
    let prefix = "PRIVMSG #a :";
    let line = format!("{}{}", prefix, "z".repeat(513 - prefix.len()));
    assert_eq!(line.len(), 513);
    match dispatcher.parse(&line) {
        Err(ProtocolError::InvalidMessage {
            cause: MessageParseError::LineTooLong { length: 513, limit: 512 },
            ..
        }) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn malformed_keywords_are_not_truncated() {
    let mut dispatcher = Dispatcher::new();
    for line in ["FOO_BAR a b :c d", "CAP* LS"] {
        let err = dispatcher.parse(line).unwrap_err();
        assert_eq!(err.raw_text(), Some(line));
    }

    let msg = dispatcher.parse("FOOBAR a b :c d").unwrap();
    assert_eq!(msg.to_string(), "FOOBAR a b :c d");
}
