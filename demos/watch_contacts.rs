//! Contact presence example
//!
//! Connects, registers, learns the server's capabilities from RPL_ISUPPORT
//! and then tracks the nicknames given on the command line with whatever
//! presence mechanism the server offers.
//!
//! ```text
//! cargo run --example watch_contacts -- irc.libera.chat 6697 tls alice bob
//! ```

use anyhow::{bail, Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use nebo_irc::command::User;
use nebo_irc::connection::{Connection, ConnectionConfig, ConnectionEvent};
use nebo_irc::presence::{spawn_poll_timer, ContactList, PresenceEvent, SharedContacts};
use nebo_irc::{Command, Message, Reply, ServerSupport};

const NICKNAME: &str = "nebo_watch";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(host) = args.next() else {
        bail!("usage: watch_contacts <host> [port] [tls] [nick...]");
    };
    let port: u16 = match args.next() {
        Some(port) => port.parse().context("invalid port")?,
        None => 6667,
    };
    let mut config = ConnectionConfig::new(host, port);
    let mut nicknames: Vec<String> = args.collect();
    if nicknames.first().map(String::as_str) == Some("tls") {
        nicknames.remove(0);
        config = config.tls();
    }

    let (mut conn, mut events) = Connection::new(config);
    conn.connect().await.context("connect failed")?;
    conn.send(&Message::nick(NICKNAME)).await?;
    conn.send(&Message::new(User::new("nebo", "nebo presence demo")))
        .await?;

    let (outgoing_tx, mut outgoing) = mpsc::unbounded_channel::<Message>();
    let mut support = ServerSupport::default();
    let mut contacts: Option<SharedContacts> = None;

    loop {
        tokio::select! {
            Some(message) = outgoing.recv() => conn.send(&message).await?,
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    ConnectionEvent::Message(message) => {
                        if support.load_message(&message) {
                            continue;
                        }
                        if let Some(Command::Ping(ping)) = message.as_command() {
                            conn.send(&Message::pong(ping.token.clone())).await?;
                            continue;
                        }
                        let registered = matches!(
                            message.as_reply(),
                            Some(Reply::EndOfMotd(_)) | Some(Reply::NoMotd(_))
                        );
                        if registered && contacts.is_none() {
                            let mut list = ContactList::new(&support);
                            info!(strategy = list.strategy_name(), "tracking {} contacts", nicknames.len());
                            let mut lines = Vec::new();
                            for nickname in &nicknames {
                                lines.extend(list.add(nickname));
                            }
                            lines.extend(list.initialize());
                            for line in &lines {
                                conn.send(line).await?;
                            }
                            let shared = SharedContacts::new(list);
                            spawn_poll_timer(shared.clone(), outgoing_tx.clone());
                            contacts = Some(shared);
                        }
                        if let Some(shared) = &contacts {
                            let changes = shared.lock().handle(&message);
                            for PresenceEvent::StatusChanged { nickname, previous, status } in changes {
                                info!(%nickname, ?previous, ?status, "presence changed");
                            }
                        }
                    }
                    ConnectionEvent::ParseFailed(e) => warn!(error = %e, "unparsed line"),
                    ConnectionEvent::Disconnected(reason) => {
                        info!(%reason, "disconnected");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(())
}
