//! Presence tracking driven by real server lines: the strategy comes from
//! RPL_ISUPPORT and replies go through a dispatcher first.

use nebo_irc::presence::{ContactList, PresenceEvent, PresenceStatus};
use nebo_irc::{Dispatcher, Message, ServerSupport};

struct Session {
    dispatcher: Dispatcher,
    contacts: ContactList,
}

impl Session {
    fn new(isupport: &str) -> Self {
        let mut dispatcher = Dispatcher::new();
        let mut support = ServerSupport::default();
        if !isupport.is_empty() {
            let line = format!(":irc.example.net 005 nebo {} :are supported by this server", isupport);
            let message = dispatcher.parse(&line).unwrap();
            assert!(support.load_message(&message));
        }
        Session {
            dispatcher,
            contacts: ContactList::new(&support),
        }
    }

    fn feed(&mut self, line: &str) -> Vec<PresenceEvent> {
        let message = self.dispatcher.parse(line).unwrap();
        self.contacts.handle(&message)
    }
}

fn lines(messages: &[Message]) -> Vec<String> {
    messages.iter().map(Message::to_string).collect()
}

fn changed(nickname: &str, previous: PresenceStatus, status: PresenceStatus) -> PresenceEvent {
    PresenceEvent::StatusChanged {
        nickname: nickname.to_string(),
        previous,
        status,
    }
}

#[test]
fn watch_session() {
    let mut session = Session::new("WATCH=128 MONITOR=100");
    assert_eq!(session.contacts.strategy_name(), "watch");

    assert_eq!(lines(&session.contacts.add("alice")), vec!["WATCH +alice"]);
    assert_eq!(lines(&session.contacts.add("Bob")), vec!["WATCH +Bob"]);
    // Already registered entries are not sent again.
    assert!(session.contacts.initialize().is_empty());

    let events = session.feed(":irc.example.net 604 nebo alice a host.a 1700000000 :is online");
    assert_eq!(
        events,
        vec![changed("alice", PresenceStatus::Unknown, PresenceStatus::Online)]
    );
    // Repeated notifications do not repeat events.
    assert!(session
        .feed(":irc.example.net 604 nebo alice a host.a 1700000000 :is online")
        .is_empty());

    let events = session.feed(":irc.example.net 601 nebo BOB b host.b 1700000100 :logged offline");
    assert_eq!(
        events,
        vec![changed("Bob", PresenceStatus::Unknown, PresenceStatus::Offline)]
    );

    assert_eq!(lines(&session.contacts.remove("alice")), vec!["WATCH -alice"]);
}

#[test]
fn monitor_session() {
    let mut session = Session::new("MONITOR=100");
    assert_eq!(session.contacts.strategy_name(), "monitor");

    assert_eq!(lines(&session.contacts.add("alice")), vec!["MONITOR + alice"]);
    assert_eq!(lines(&session.contacts.add("carol")), vec!["MONITOR + carol"]);
    assert!(session.contacts.add("ALICE").is_empty());

    let events = session.feed(":irc.example.net 730 nebo :alice!a@host.a,carol!c@host.c");
    assert_eq!(events.len(), 2);
    assert_eq!(session.contacts.status("carol"), Some(PresenceStatus::Online));

    let events = session.feed(":irc.example.net 731 nebo :carol");
    assert_eq!(
        events,
        vec![changed("carol", PresenceStatus::Online, PresenceStatus::Offline)]
    );
}

#[test]
fn bare_monitor_token_means_unlimited() {
    let session = Session::new("MONITOR");
    assert_eq!(session.contacts.strategy_name(), "monitor");
}

#[test]
fn ison_session() {
    let mut session = Session::new("");
    assert_eq!(session.contacts.strategy_name(), "ison");
    assert!(session.contacts.poll_interval().is_some());

    // Polling never registers anything up front.
    assert!(session.contacts.add("alice").is_empty());
    assert!(session.contacts.add("bob").is_empty());

    assert_eq!(lines(&session.contacts.tick()), vec!["ISON alice bob"]);
    // Unanswered poll: the next tick waits.
    assert!(session.contacts.tick().is_empty());

    let events = session.feed(":irc.example.net 303 nebo :Alice");
    assert_eq!(
        events,
        vec![
            changed("alice", PresenceStatus::Unknown, PresenceStatus::Online),
            changed("bob", PresenceStatus::Unknown, PresenceStatus::Offline),
        ]
    );
    assert_eq!(session.contacts.status("bob"), Some(PresenceStatus::Offline));

    assert_eq!(lines(&session.contacts.tick()), vec!["ISON alice bob"]);
}

#[test]
fn unrelated_traffic_is_ignored() {
    let mut session = Session::new("WATCH=10");
    session.contacts.add("alice");
    assert!(session.feed(":alice!a@h PRIVMSG nebo :hi").is_empty());
    assert!(session.feed(":irc.example.net 372 nebo :- motd").is_empty());
    assert_eq!(session.contacts.status("alice"), Some(PresenceStatus::Unknown));
}

#[test]
fn every_batched_line_fits_the_ceiling() {
    let mut session = Session::new("");
    for i in 0..200 {
        session.contacts.add(&format!("contact_{:03}", i));
    }
    let out = session.contacts.tick();
    assert!(out.len() > 1);
    for message in &out {
        assert!(message.to_string().len() + 2 <= 512);
    }
}

#[test]
fn ison_recovers_from_an_error_reply() {
    let mut session = Session::new("");
    session.contacts.add("alice");
    assert_eq!(lines(&session.contacts.tick()), vec!["ISON alice"]);
    assert!(session
        .feed(":irc.example.net 263 nebo ISON :Server load is temporarily too heavy")
        .is_empty());

    // One interval of grace, then the query is sent again.
    assert!(session.contacts.tick().is_empty());
    assert_eq!(lines(&session.contacts.tick()), vec!["ISON alice"]);
    assert_eq!(
        session.feed(":irc.example.net 303 nebo :alice"),
        vec![changed("alice", PresenceStatus::Unknown, PresenceStatus::Online)]
    );
}
