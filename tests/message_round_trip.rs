//! Integration tests for message parsing and serialization
//!
//! Canonical wire lines must survive parse then format byte for byte, and
//! formatted messages must parse back to equal values.

use nebo_irc::command::{ChannelModeChange, Kick, Privmsg};
use nebo_irc::ctcp::{Action, Dcc, Ping, PingReply};
use nebo_irc::response::{NamesReply, Welcome};
use nebo_irc::{Body, Command, Ctcp, Dispatcher, Message, Prefix, Reply};

fn round_trip(line: &str) -> Message {
    let message: Message = line.parse().expect("Failed to parse message");
    assert_eq!(message.to_string(), line, "formatting changed the line");
    let reparsed: Message = message.to_string().parse().expect("Failed to reparse message");
    assert_eq!(message, reparsed);
    message
}

#[test]
fn test_message_round_trip_simple() {
    round_trip("PING :irc.example.com");
}

#[test]
fn test_message_round_trip_with_prefix() {
    let message = round_trip(":nick!user@host PRIVMSG #channel :Hello, world!");
    assert_eq!(message.source_nickname(), Some("nick"));
}

#[test]
fn test_message_round_trip_numeric_response() {
    let message = round_trip(":server.example 001 nickname :Welcome to the IRC Network");
    let numeric = message.as_numeric().unwrap();
    assert_eq!(numeric.target, "nickname");
    assert_eq!(
        numeric.reply,
        Reply::Welcome(Welcome {
            text: "Welcome to the IRC Network".into()
        })
    );
}

#[test]
fn test_names_reply_round_trip() {
    let message = round_trip(":irc.x 353 me = #rust :@alice +bob carol");
    match message.as_reply() {
        Some(Reply::Names(NamesReply { channel, names, .. })) => {
            assert_eq!(channel, "#rust");
            assert_eq!(names.len(), 3);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_lines_round_trip_verbatim() {
    round_trip(":irc.x FROBNICATE a b :c d e");
    round_trip(":irc.x 999 me x y :generic reply");
    round_trip(":irc.x 499 me #c :generic error");
}

#[test]
fn test_ctcp_round_trip() {
    let message = round_trip(":a!b@c PRIVMSG bob :\x01PING 12345\x01");
    assert_eq!(
        message.as_ctcp().unwrap().ctcp,
        Ctcp::Ping(Ping {
            token: "12345".into()
        })
    );
    let reply = round_trip(":bob!b@d NOTICE a :\x01PING 12345\x01");
    assert_eq!(
        reply.as_ctcp().unwrap().ctcp,
        Ctcp::PingReply(PingReply {
            token: "12345".into()
        })
    );
}

#[test]
fn test_ctcp_quoting_round_trip() {
    let message = Message::ctcp_request("#a", Action::new("line\none\\two"));
    let text = message.to_string();
    assert_eq!(text, "PRIVMSG #a :\x01ACTION line\\none\\\\two\x01");
    let parsed: Message = text.parse().unwrap();
    assert_eq!(parsed, message);
}

#[test]
fn test_dcc_send() {
    let message = round_trip(":a!b@c PRIVMSG bob :\x01DCC SEND file.txt 3232235777 5000 1024\x01");
    match &message.as_ctcp().unwrap().ctcp {
        Ctcp::Dcc(dcc @ Dcc { port, .. }) => {
            assert_eq!(*port, 5000);
            assert_eq!(dcc.ip_addr().unwrap().to_string(), "192.168.1.1");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_message_construction_and_parsing() {
    let message = Message::new(Privmsg::new("#test", "Integration test message"))
        .with_prefix(Prefix::new_user("testbot", "test", "example.com"));

    let serialized = message.to_string();
    assert_eq!(
        serialized,
        ":testbot!test@example.com PRIVMSG #test :Integration test message"
    );

    let parsed: Message = serialized.parse().expect("Failed to parse constructed message");
    assert_eq!(message, parsed);
}

#[test]
fn test_kick_and_mode() {
    let kick = round_trip(":op!o@h KICK #rust spammer :bye");
    assert_eq!(
        kick.body,
        Body::Command(Command::Kick(Kick {
            channel: "#rust".into(),
            users: vec!["spammer".into()],
            comment: Some("bye".into()),
        }))
    );

    let mode = round_trip(":op!o@h MODE #rust +ov alice bob");
    match mode.as_command() {
        Some(Command::ChannelMode(ChannelModeChange { modes, args, .. })) => {
            assert_eq!(modes.as_deref(), Some("+ov"));
            assert_eq!(args, &["alice", "bob"]);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_reused_dispatcher_matches_fresh_parse() {
    let lines = [
        ":irc.x 001 me :hi",
        ":a!b@c JOIN #rust",
        ":a!b@c PRIVMSG #rust :yo",
        ":irc.x 001 me :hi",
        "PING :x",
    ];
    let mut dispatcher = Dispatcher::new();
    for line in lines {
        let fresh: Message = line.parse().unwrap();
        assert_eq!(dispatcher.parse(line).unwrap(), fresh);
    }
}
