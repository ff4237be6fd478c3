//! WATCH-based tracking: the server pushes 600/601 on every log on or off
//! and answers each `+nick` with 604/605.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use super::{line_budget, Contacts, PresenceEvent, PresenceStatus, PresenceStrategy};
use crate::command::{Watch, WatchEntry};
use crate::message::Message;
use crate::response::Reply;
use crate::util::pack_items;

#[derive(Debug)]
pub struct WatchStrategy {
    limit: usize,
    /// Case-mapped keys currently on the server's list.
    registered: BTreeSet<String>,
}

impl WatchStrategy {
    /// `limit` is the advertised `WATCH=n`.
    pub fn new(limit: usize) -> Self {
        WatchStrategy {
            limit,
            registered: BTreeSet::new(),
        }
    }

    pub fn registered(&self) -> usize {
        self.registered.len()
    }

    fn watch_lines(tokens: &[String]) -> Vec<Message> {
        pack_items(tokens.iter().map(String::as_str), 1, line_budget("WATCH "), usize::MAX)
            .into_iter()
            .map(|group| {
                Message::new(Watch {
                    entries: group
                        .into_iter()
                        .map(|t| match t.strip_prefix('-') {
                            Some(nick) => WatchEntry::Remove(nick.to_string()),
                            None => WatchEntry::Add(t.trim_start_matches('+').to_string()),
                        })
                        .collect(),
                })
            })
            .collect()
    }
}

impl PresenceStrategy for WatchStrategy {
    fn name(&self) -> &'static str {
        "watch"
    }

    fn initialize(&mut self, contacts: &Contacts) -> Vec<Message> {
        let mut tokens = Vec::new();
        for contact in contacts.iter() {
            let key = contacts.key(&contact.nickname);
            if self.registered.contains(&key) {
                continue;
            }
            if self.registered.len() >= self.limit {
                warn!(nickname = %contact.nickname, limit = self.limit, "WATCH list full, not registering");
                continue;
            }
            self.registered.insert(key);
            tokens.push(format!("+{}", contact.nickname));
        }
        debug!(count = tokens.len(), "registering WATCH entries");
        Self::watch_lines(&tokens)
    }

    fn on_contact_added(&mut self, nickname: &str, contacts: &Contacts) -> Vec<Message> {
        if self.registered.len() >= self.limit {
            warn!(nickname, limit = self.limit, "WATCH list full, not registering");
            return Vec::new();
        }
        if !self.registered.insert(contacts.key(nickname)) {
            return Vec::new();
        }
        Self::watch_lines(&[format!("+{}", nickname)])
    }

    fn on_contact_removed(&mut self, nickname: &str, contacts: &Contacts) -> Vec<Message> {
        if !self.registered.remove(&contacts.key(nickname)) {
            return Vec::new();
        }
        Self::watch_lines(&[format!("-{}", nickname)])
    }

    fn handle(&mut self, message: &Message, contacts: &mut Contacts) -> Vec<PresenceEvent> {
        let Some(reply) = message.as_reply() else {
            return Vec::new();
        };
        let (entry, status) = match reply {
            Reply::LogOn(r) => ((&r.nickname, &r.username, &r.host, r.since), PresenceStatus::Online),
            Reply::NowOn(r) => ((&r.nickname, &r.username, &r.host, r.since), PresenceStatus::Online),
            Reply::LogOff(r) => ((&r.nickname, &r.username, &r.host, r.since), PresenceStatus::Offline),
            Reply::NowOff(r) => ((&r.nickname, &r.username, &r.host, r.since), PresenceStatus::Offline),
            Reply::TooManyWatch(r) => {
                warn!(nickname = %r.nickname, "server rejected WATCH entry");
                self.registered.remove(&contacts.key(&r.nickname));
                return Vec::new();
            }
            _ => return Vec::new(),
        };
        let (nickname, username, host, since) = entry;
        let event = contacts.set_status(nickname, status);
        contacts.merge_profile(nickname, Some(username.as_str()), Some(host.as_str()), since);
        event.into_iter().collect()
    }
}
