//! Connection lifecycle against a loopback server.

#![cfg(feature = "tokio")]

use std::time::Duration;

use nebo_irc::connection::{
    Connection, ConnectionConfig, ConnectionError, ConnectionEvent, ConnectionState,
    DisconnectReason,
};
use nebo_irc::command::RawCommand;
use nebo_irc::error::MessageParseError;
use nebo_irc::message::RawLine;
use nebo_irc::{Body, Command, Message, MessageType, ProtocolError, Reply};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

async fn next(rx: &mut UnboundedReceiver<ConnectionEvent>) -> ConnectionEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}

/// Connect to a fresh listener and return the server side of the socket.
async fn connected() -> (Connection, UnboundedReceiver<ConnectionEvent>, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (mut conn, mut rx) = Connection::new(ConnectionConfig::new("127.0.0.1", port));

    let (accepted, result) = tokio::join!(listener.accept(), conn.connect());
    result.unwrap();
    let (server, _) = accepted.unwrap();

    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::StateChanged(ConnectionState::Connecting)
    ));
    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::StateChanged(ConnectionState::Connected)
    ));
    assert_eq!(conn.state(), ConnectionState::Connected);
    (conn, rx, server)
}

#[tokio::test]
async fn inbound_lines_become_events() {
    let (_conn, mut rx, mut server) = connected().await;
    server
        .write_all(b":irc.example.net 001 nebo :Welcome\r\nPING :abc\n")
        .await
        .unwrap();

    match next(&mut rx).await {
        ConnectionEvent::DataReceived(line) => assert_eq!(line, ":irc.example.net 001 nebo :Welcome"),
        other => panic!("unexpected {:?}", other),
    }
    match next(&mut rx).await {
        ConnectionEvent::Message(message) => {
            assert!(matches!(message.as_reply(), Some(Reply::Welcome(_))))
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataReceived(line) if line == "PING :abc"));
    assert!(matches!(next(&mut rx).await, ConnectionEvent::Message(_)));
}

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

#[tokio::test]
async fn registered_types_reach_the_reader() {
    let (conn, mut rx, mut server) = connected().await;
    conn.register(Box::new(BotCommand));
    server
        .write_all(b":a!b@c PRIVMSG #rust :!roll 2d6
")
        .await
        .unwrap();

    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataReceived(_)));
    match next(&mut rx).await {
        ConnectionEvent::Message(message) => assert_eq!(message.to_string(), ":a!b@c BOT roll 2d6"),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn surrounding_whitespace_is_trimmed() {
    let (_conn, mut rx, mut server) = connected().await;
    server.write_all(b"  PING :padded 	
").await.unwrap();

    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataReceived(line) if line == "PING :padded"));
    match next(&mut rx).await {
        ConnectionEvent::Message(message) => {
            assert!(matches!(message.as_command(), Some(Command::Ping(ping)) if ping.token == "padded"))
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn bad_lines_do_not_stop_the_reader() {
    let (_conn, mut rx, mut server) = connected().await;
    let overlong = format!("PRIVMSG #a :{}\r\n", "x".repeat(600));
    server.write_all(b":irc.x 353 me\r\n").await.unwrap();
    server.write_all(overlong.as_bytes()).await.unwrap();
    server.write_all(b"PING :after\r\n").await.unwrap();

    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataReceived(_)));
    assert!(matches!(next(&mut rx).await, ConnectionEvent::ParseFailed(_)));
    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataReceived(_)));
    assert!(matches!(next(&mut rx).await, ConnectionEvent::ParseFailed(_)));
    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataReceived(line) if line == "PING :after"));
    assert!(matches!(next(&mut rx).await, ConnectionEvent::Message(_)));
}

#[tokio::test]
async fn writes_reach_the_server() {
    let (mut conn, mut rx, server) = connected().await;
    conn.send(&Message::nick("nebo")).await.unwrap();
    conn.write("USER nebo 0 * :Nebo\r\n").await.unwrap();

    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataSent(line) if line == "NICK nebo"));
    assert!(
        matches!(next(&mut rx).await, ConnectionEvent::DataSent(line) if line == "USER nebo 0 * :Nebo")
    );

    let mut lines = BufReader::new(server).lines();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("NICK nebo\r"));
    assert_eq!(
        lines.next_line().await.unwrap().as_deref(),
        Some("USER nebo 0 * :Nebo\r")
    );
}

#[tokio::test]
async fn oversize_writes_are_refused() {
    let (mut conn, mut rx, _server) = connected().await;
    let text = format!("PRIVMSG #a :{}", "x".repeat(500));
    match conn.write(&text).await {
        Err(ConnectionError::Oversize { length, limit }) => {
            assert_eq!(length, text.len() + 2);
            assert_eq!(limit, 512);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(
        conn.write("PRIVMSG #a :ok\0").await,
        Err(ConnectionError::Protocol(ProtocolError::IllegalControlChar('\0')))
    ));
    // Still connected and usable.
    conn.write("PING :x").await.unwrap();
    assert!(matches!(next(&mut rx).await, ConnectionEvent::DataSent(_)));
}

#[tokio::test]
async fn settings_are_frozen_while_connected() {
    let (mut conn, _rx, _server) = connected().await;
    assert!(matches!(conn.set_port(6697), Err(ConnectionError::Busy)));
    assert!(matches!(conn.set_encoding("latin1"), Err(ConnectionError::Busy)));
    assert!(matches!(conn.connect().await, Err(ConnectionError::Busy)));
}

#[tokio::test]
async fn disconnect_reports_cancellation() {
    let (mut conn, mut rx, _server) = connected().await;
    conn.disconnect().await;
    assert_eq!(conn.state(), ConnectionState::Disconnected);

    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::StateChanged(ConnectionState::Disconnected)
    ));
    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::Disconnected(DisconnectReason::Cancelled)
    ));
    assert!(rx.try_recv().is_err());

    assert!(matches!(conn.write("PING :x").await, Err(ConnectionError::NotConnected)));
    conn.set_port(6697).unwrap();
}

#[tokio::test]
async fn peer_close_is_reported() {
    let (mut conn, mut rx, server) = connected().await;
    drop(server);

    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::StateChanged(ConnectionState::Disconnected)
    ));
    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::Disconnected(DisconnectReason::Closed)
    ));
    assert!(matches!(conn.write("PING :x").await, Err(ConnectionError::NotConnected)));
}

#[tokio::test]
async fn refused_connect_is_reported() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let (mut conn, mut rx) = Connection::new(ConnectionConfig::new("127.0.0.1", port));
    assert!(matches!(conn.connect().await, Err(ConnectionError::Io(_))));

    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::StateChanged(ConnectionState::Connecting)
    ));
    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::StateChanged(ConnectionState::Disconnected)
    ));
    assert!(matches!(
        next(&mut rx).await,
        ConnectionEvent::Disconnected(DisconnectReason::Error(_))
    ));
    assert_eq!(conn.state(), ConnectionState::Disconnected);
}
