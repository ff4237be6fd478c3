//! MONITOR-based tracking (730 online, 731 offline).

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::{line_budget, Contacts, PresenceEvent, PresenceStatus, PresenceStrategy};
use crate::command::{Monitor, MonitorAction};
use crate::message::Message;
use crate::response::Reply;
use crate::util::pack_items;

#[derive(Debug)]
pub struct MonitorStrategy {
    limit: usize,
    registered: BTreeSet<String>,
}

impl MonitorStrategy {
    /// `limit` is the advertised `MONITOR=n`, `usize::MAX` when unbounded.
    pub fn new(limit: usize) -> Self {
        MonitorStrategy {
            limit,
            registered: BTreeSet::new(),
        }
    }

    pub fn registered(&self) -> usize {
        self.registered.len()
    }

    fn lines(nicks: &[&str], action: MonitorAction) -> Vec<Message> {
        pack_items(nicks.iter().copied(), 1, line_budget("MONITOR + "), usize::MAX)
            .into_iter()
            .map(|group| {
                Message::new(Monitor {
                    action,
                    targets: group.into_iter().map(str::to_string).collect(),
                })
            })
            .collect()
    }
}

impl PresenceStrategy for MonitorStrategy {
    fn name(&self) -> &'static str {
        "monitor"
    }

    fn initialize(&mut self, contacts: &Contacts) -> Vec<Message> {
        let mut nicks = Vec::new();
        for contact in contacts.iter() {
            let key = contacts.key(&contact.nickname);
            if self.registered.contains(&key) {
                continue;
            }
            if self.registered.len() >= self.limit {
                warn!(nickname = %contact.nickname, limit = self.limit, "MONITOR list full, not registering");
                continue;
            }
            self.registered.insert(key);
            nicks.push(contact.nickname.as_str());
        }
        debug!(count = nicks.len(), "registering MONITOR targets");
        Self::lines(&nicks, MonitorAction::Add)
    }

    fn on_contact_added(&mut self, nickname: &str, contacts: &Contacts) -> Vec<Message> {
        if self.registered.len() >= self.limit {
            warn!(nickname, limit = self.limit, "MONITOR list full, not registering");
            return Vec::new();
        }
        if !self.registered.insert(contacts.key(nickname)) {
            return Vec::new();
        }
        Self::lines(&[nickname], MonitorAction::Add)
    }

    fn on_contact_removed(&mut self, nickname: &str, contacts: &Contacts) -> Vec<Message> {
        if !self.registered.remove(&contacts.key(nickname)) {
            return Vec::new();
        }
        Self::lines(&[nickname], MonitorAction::Remove)
    }

    fn handle(&mut self, message: &Message, contacts: &mut Contacts) -> Vec<PresenceEvent> {
        match message.as_reply() {
            Some(Reply::MonOnline(reply)) => {
                let mut events = Vec::new();
                for target in &reply.targets {
                    let (nick, user, host) = split_target(target);
                    events.extend(contacts.set_status(nick, PresenceStatus::Online));
                    contacts.merge_profile(nick, user, host, 0);
                }
                events
            }
            Some(Reply::MonOffline(reply)) => reply
                .nicknames
                .iter()
                .filter_map(|nick| contacts.set_status(nick, PresenceStatus::Offline))
                .collect(),
            Some(Reply::MonListFull(reply)) => {
                warn!(limit = reply.limit, targets = ?reply.targets, "server rejected MONITOR targets");
                for target in &reply.targets {
                    self.registered.remove(&contacts.key(target));
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

/// `nick!user@host` or a bare `nick`.
fn split_target(target: &str) -> (&str, Option<&str>, Option<&str>) {
    match target.split_once('!') {
        Some((nick, rest)) => match rest.split_once('@') {
            Some((user, host)) => (nick, Some(user), Some(host)),
            None => (nick, Some(rest), None),
        },
        None => (target, None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casemap::CaseMapping;
    use crate::presence::ContactList;

    fn list(limit: usize) -> ContactList {
        ContactList::with_strategy(Box::new(MonitorStrategy::new(limit)), CaseMapping::Rfc1459)
    }

    #[test]
    fn initialize_batches_with_commas() {
        let mut contacts = list(usize::MAX);
        for nick in ["carol", "alice", "bob"] {
            contacts.contacts.insert(nick);
        }
        let out = contacts.initialize();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to_string(), "MONITOR + alice,bob,carol");
        assert!(contacts.initialize().is_empty());
    }

    #[test]
    fn online_offline_lists() {
        let mut contacts = list(100);
        contacts.add("alice");
        contacts.add("bob");
        let online: Message = ":irc.x 730 me :alice!a@h,bob!b@h,zed!z@h".parse().unwrap();
        assert_eq!(contacts.handle(&online).len(), 2);
        assert_eq!(contacts.contacts().get("alice").unwrap().username.as_deref(), Some("a"));
        let offline: Message = ":irc.x 731 me :bob".parse().unwrap();
        let events = contacts.handle(&offline);
        assert_eq!(
            events,
            vec![PresenceEvent::StatusChanged {
                nickname: "bob".into(),
                previous: PresenceStatus::Online,
                status: PresenceStatus::Offline,
            }]
        );
    }

    #[test]
    fn list_full_unregisters() {
        let mut contacts = list(100);
        contacts.add("alice");
        let full: Message = ":irc.x 734 me 100 alice :Monitor list is full.".parse().unwrap();
        assert!(contacts.handle(&full).is_empty());
        // A second removal has nothing left to unregister.
        assert!(contacts.remove("alice").is_empty());
    }

    #[test]
    fn removal_sends_minus() {
        let mut contacts = list(100);
        contacts.add("Alice");
        assert_eq!(contacts.remove("alice")[0].to_string(), "MONITOR - Alice");
    }
}
