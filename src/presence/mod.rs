//! Online/offline tracking for a list of contacts.
//!
//! A [`ContactList`] owns the contacts and exactly one
//! [`PresenceStrategy`], chosen from what the server advertises:
//!
//! 1. WATCH when `WATCH=n` with `n > 0`,
//! 2. otherwise MONITOR when `MONITOR` is present,
//! 3. otherwise periodic ISON polling.
//!
//! Strategies are sans-IO. They return the [`Message`]s to send and consume
//! the messages the caller feeds back; they never own the transport. Status
//! changes are reported once per transition.
//!
//! # Example
//!
//! ```
//! use nebo_irc::isupport::ServerSupport;
//! use nebo_irc::presence::{ContactList, PresenceStatus};
//! use nebo_irc::Message;
//!
//! let mut support = ServerSupport::default();
//! support.load([("MONITOR", Some("100"))]);
//!
//! let mut contacts = ContactList::new(&support);
//! assert_eq!(contacts.strategy_name(), "monitor");
//!
//! let out = contacts.add("alice");
//! assert_eq!(out[0].to_string(), "MONITOR + alice");
//!
//! let online: Message = ":irc.example.net 730 me :alice!a@host".parse().unwrap();
//! let events = contacts.handle(&online);
//! assert_eq!(events.len(), 1);
//! assert_eq!(contacts.status("ALICE"), Some(PresenceStatus::Online));
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::casemap::CaseMapping;
use crate::isupport::ServerSupport;
use crate::message::Message;

mod ison;
mod monitor;
#[cfg(feature = "tokio")]
mod timer;
mod watch;

pub use self::ison::{IsonStrategy, PollingConfig};
pub use self::monitor::MonitorStrategy;
#[cfg(feature = "tokio")]
pub use self::timer::{spawn_poll_timer, SharedContacts};
pub use self::watch::WatchStrategy;

/// What we currently believe about a contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PresenceStatus {
    /// No information yet.
    #[default]
    Unknown,
    Online,
    Offline,
}

/// A tracked nickname.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contact {
    /// The nickname as the user entered it.
    pub nickname: String,
    pub status: PresenceStatus,
    /// User name from the latest reply that carried one.
    pub username: Option<String>,
    pub host: Option<String>,
    /// When the status last changed. Server time when the reply carries it.
    pub last_change: Option<DateTime<Utc>>,
}

impl Contact {
    fn new(nickname: &str) -> Self {
        Contact {
            nickname: nickname.to_string(),
            status: PresenceStatus::Unknown,
            username: None,
            host: None,
            last_change: None,
        }
    }
}

/// Emitted when a contact's status actually changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresenceEvent {
    StatusChanged {
        nickname: String,
        previous: PresenceStatus,
        status: PresenceStatus,
    },
}

/// The contact collection, keyed by case-mapped nickname.
#[derive(Clone, Debug, Default)]
pub struct Contacts {
    mapping: CaseMapping,
    entries: BTreeMap<String, Contact>,
}

impl Contacts {
    pub fn new(mapping: CaseMapping) -> Self {
        Contacts {
            mapping,
            entries: BTreeMap::new(),
        }
    }

    pub fn case_mapping(&self) -> CaseMapping {
        self.mapping
    }

    /// The lookup key for `nickname`.
    pub fn key(&self, nickname: &str) -> String {
        self.mapping.to_lower(nickname)
    }

    pub fn get(&self, nickname: &str) -> Option<&Contact> {
        self.entries.get(&self.key(nickname))
    }

    pub fn contains(&self, nickname: &str) -> bool {
        self.entries.contains_key(&self.key(nickname))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.entries.values()
    }

    /// Nicknames in key order.
    pub fn nicknames(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|c| c.nickname.as_str())
    }

    fn insert(&mut self, nickname: &str) -> bool {
        let key = self.key(nickname);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, Contact::new(nickname));
        true
    }

    fn remove(&mut self, nickname: &str) -> Option<Contact> {
        let key = self.key(nickname);
        self.entries.remove(&key)
    }

    /// Record a status. Returns an event only when it differs from the
    /// current one; untracked nicknames are ignored.
    pub fn set_status(&mut self, nickname: &str, status: PresenceStatus) -> Option<PresenceEvent> {
        let key = self.key(nickname);
        let contact = self.entries.get_mut(&key)?;
        if contact.status == status {
            return None;
        }
        let previous = std::mem::replace(&mut contact.status, status);
        contact.last_change = Some(Utc::now());
        Some(PresenceEvent::StatusChanged {
            nickname: contact.nickname.clone(),
            previous,
            status,
        })
    }

    /// Merge profile details from a presence reply into a tracked contact.
    ///
    /// Missing, empty and `*` values leave the stored field alone. `since`
    /// is the server's unix timestamp; zero means unknown.
    pub fn merge_profile(
        &mut self,
        nickname: &str,
        username: Option<&str>,
        host: Option<&str>,
        since: i64,
    ) {
        let key = self.key(nickname);
        let Some(contact) = self.entries.get_mut(&key) else {
            return;
        };
        let known = |value: Option<&str>| value.filter(|v| !v.is_empty() && *v != "*").map(str::to_string);
        if let Some(username) = known(username) {
            contact.username = Some(username);
        }
        if let Some(host) = known(host) {
            contact.host = Some(host);
        }
        if since > 0 {
            if let Some(at) = DateTime::from_timestamp(since, 0) {
                contact.last_change = Some(at);
            }
        }
    }
}

/// One way of learning whether contacts are online.
///
/// Methods returning `Vec<Message>` hand back lines for the caller to send.
pub trait PresenceStrategy: fmt::Debug + Send {
    /// Short identifier, e.g. `"watch"`.
    fn name(&self) -> &'static str;

    /// Register the whole current contact set.
    fn initialize(&mut self, contacts: &Contacts) -> Vec<Message>;

    /// `nickname` was just added to `contacts`.
    fn on_contact_added(&mut self, nickname: &str, contacts: &Contacts) -> Vec<Message>;

    /// `nickname` was just removed from `contacts`.
    fn on_contact_removed(&mut self, nickname: &str, contacts: &Contacts) -> Vec<Message>;

    /// Feed an inbound message; returns the resulting status changes.
    fn handle(&mut self, message: &Message, contacts: &mut Contacts) -> Vec<PresenceEvent>;

    /// Periodic work. Only polling does anything here.
    fn tick(&mut self, _contacts: &Contacts) -> Vec<Message> {
        Vec::new()
    }

    /// The polling period, for strategies that need a timer.
    fn poll_interval(&self) -> Option<std::time::Duration> {
        None
    }
}

/// Pick the best strategy the server supports, polling with defaults.
pub fn select_strategy(support: &ServerSupport) -> Box<dyn PresenceStrategy> {
    select_strategy_with(support, PollingConfig::default())
}

/// Like [`select_strategy`], with explicit polling settings.
pub fn select_strategy_with(
    support: &ServerSupport,
    polling: PollingConfig,
) -> Box<dyn PresenceStrategy> {
    if support.max_watches() > 0 {
        Box::new(WatchStrategy::new(support.max_watches()))
    } else if support.max_monitors() > 0 {
        Box::new(MonitorStrategy::new(support.max_monitors()))
    } else {
        Box::new(IsonStrategy::new(polling))
    }
}

/// Tracked contacts plus the strategy keeping them current.
#[derive(Debug)]
pub struct ContactList {
    contacts: Contacts,
    strategy: Box<dyn PresenceStrategy>,
}

impl ContactList {
    /// Choose a strategy from `support` and adopt its case mapping.
    pub fn new(support: &ServerSupport) -> Self {
        Self::with_strategy(select_strategy(support), support.case_mapping())
    }

    pub fn with_strategy(strategy: Box<dyn PresenceStrategy>, mapping: CaseMapping) -> Self {
        ContactList {
            contacts: Contacts::new(mapping),
            strategy,
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn contacts(&self) -> &Contacts {
        &self.contacts
    }

    pub fn status(&self, nickname: &str) -> Option<PresenceStatus> {
        self.contacts.get(nickname).map(|c| c.status)
    }

    /// Start tracking `nickname`. Already tracked names produce nothing.
    pub fn add(&mut self, nickname: &str) -> Vec<Message> {
        if !self.contacts.insert(nickname) {
            return Vec::new();
        }
        self.strategy.on_contact_added(nickname, &self.contacts)
    }

    /// Stop tracking `nickname`.
    pub fn remove(&mut self, nickname: &str) -> Vec<Message> {
        match self.contacts.remove(nickname) {
            Some(contact) => self
                .strategy
                .on_contact_removed(&contact.nickname, &self.contacts),
            None => Vec::new(),
        }
    }

    /// Register every contact, typically once registration completes.
    pub fn initialize(&mut self) -> Vec<Message> {
        self.strategy.initialize(&self.contacts)
    }

    pub fn handle(&mut self, message: &Message) -> Vec<PresenceEvent> {
        self.strategy.handle(message, &mut self.contacts)
    }

    pub fn tick(&mut self) -> Vec<Message> {
        self.strategy.tick(&self.contacts)
    }

    pub fn poll_interval(&self) -> Option<std::time::Duration> {
        self.strategy.poll_interval()
    }
}

/// Budget for the variable part of a line whose fixed part is `fixed`,
/// leaving room for CRLF and a trailing-parameter colon.
pub(crate) fn line_budget(fixed: &str) -> usize {
    crate::util::MAX_LINE_LENGTH
        .saturating_sub(crate::util::LINE_TERMINATOR.len() + fixed.len() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_selection_order() {
        let mut support = ServerSupport::default();
        assert_eq!(select_strategy(&support).name(), "ison");
        support.load([("MONITOR", Some("50"))]);
        assert_eq!(select_strategy(&support).name(), "monitor");
        support.load([("WATCH", Some("128"))]);
        assert_eq!(select_strategy(&support).name(), "watch");
    }

    #[test]
    fn status_changes_only_on_transition() {
        let mut contacts = Contacts::new(CaseMapping::Rfc1459);
        contacts.insert("Nick[a]");
        assert!(contacts.set_status("nick{a}", PresenceStatus::Online).is_some());
        assert!(contacts.set_status("NICK{A}", PresenceStatus::Online).is_none());
        assert_eq!(
            contacts.set_status("nick[a]", PresenceStatus::Offline),
            Some(PresenceEvent::StatusChanged {
                nickname: "Nick[a]".into(),
                previous: PresenceStatus::Online,
                status: PresenceStatus::Offline,
            })
        );
        assert!(contacts.set_status("stranger", PresenceStatus::Online).is_none());
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let mut list = ContactList::with_strategy(Box::new(WatchStrategy::new(10)), CaseMapping::Ascii);
        assert_eq!(list.add("bob").len(), 1);
        assert!(list.add("BOB").is_empty());
        assert_eq!(list.contacts().len(), 1);
        assert!(list.remove("nobody").is_empty());
    }

    #[test]
    fn profile_merges_skip_placeholders() {
        let mut contacts = Contacts::new(CaseMapping::Ascii);
        contacts.insert("alice");
        contacts.merge_profile("ALICE", Some("al"), Some("host.a"), 1_700_000_000);
        contacts.merge_profile("alice", Some("*"), None, 0);

        let alice = contacts.get("alice").unwrap();
        assert_eq!(alice.username.as_deref(), Some("al"));
        assert_eq!(alice.host.as_deref(), Some("host.a"));
        assert_eq!(alice.last_change.map(|t| t.timestamp()), Some(1_700_000_000));
    }
}
