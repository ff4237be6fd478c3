//! ISON polling, for servers with neither WATCH nor MONITOR.
//!
//! Every tick sends ISON for all contacts, split over as many lines as the
//! 512-byte ceiling needs. Each line becomes one pending query; 303 replies
//! are matched to queries in the order they were sent. A contact in a
//! query but missing from its reply is offline. Queries still unanswered
//! after a whole skipped interval are given up on and the poll is resent.

use std::collections::{BTreeSet, VecDeque};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{line_budget, Contacts, PresenceEvent, PresenceStatus, PresenceStrategy};
use crate::command::Ison;
use crate::message::Message;
use crate::response::Reply;
use crate::util::pack_items;

/// Polling settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollingConfig {
    /// Time between polls. Fixed for the strategy's lifetime.
    pub interval: Duration,
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            interval: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
pub struct IsonStrategy {
    interval: Duration,
    /// Nicknames asked about by each unanswered ISON line, oldest first.
    pending: VecDeque<Vec<String>>,
    /// A tick has already been skipped waiting on `pending`.
    stalled: bool,
}

impl IsonStrategy {
    pub fn new(config: PollingConfig) -> Self {
        IsonStrategy {
            interval: config.interval,
            pending: VecDeque::new(),
            stalled: false,
        }
    }

    /// Queries sent but not yet answered.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn poll(&mut self, contacts: &Contacts) -> Vec<Message> {
        self.stalled = false;
        let groups = pack_items(contacts.nicknames(), 1, line_budget("ISON "), usize::MAX);
        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            self.pending
                .push_back(group.iter().map(|n| n.to_string()).collect());
            out.push(Message::new(Ison::new(group)));
        }
        trace!(lines = out.len(), "polling with ISON");
        out
    }
}

impl PresenceStrategy for IsonStrategy {
    fn name(&self) -> &'static str {
        "ison"
    }

    /// Polls once right away so statuses are known before the first tick.
    fn initialize(&mut self, contacts: &Contacts) -> Vec<Message> {
        self.pending.clear();
        self.poll(contacts)
    }

    fn on_contact_added(&mut self, _nickname: &str, _contacts: &Contacts) -> Vec<Message> {
        Vec::new()
    }

    fn on_contact_removed(&mut self, _nickname: &str, _contacts: &Contacts) -> Vec<Message> {
        Vec::new()
    }

    fn handle(&mut self, message: &Message, contacts: &mut Contacts) -> Vec<PresenceEvent> {
        let Some(Reply::Ison(reply)) = message.as_reply() else {
            return Vec::new();
        };
        let Some(asked) = self.pending.pop_front() else {
            debug!("ISON reply without a pending query");
            return Vec::new();
        };
        let online: BTreeSet<String> = reply.nicknames.iter().map(|n| contacts.key(n)).collect();
        asked
            .iter()
            .filter_map(|nick| {
                let status = if online.contains(&contacts.key(nick)) {
                    PresenceStatus::Online
                } else {
                    PresenceStatus::Offline
                };
                contacts.set_status(nick, status)
            })
            .collect()
    }

    fn tick(&mut self, contacts: &Contacts) -> Vec<Message> {
        if !self.pending.is_empty() {
            if !self.stalled {
                debug!(pending = self.pending.len(), "previous poll unanswered, skipping");
                self.stalled = true;
                return Vec::new();
            }
            warn!(pending = self.pending.len(), "ISON queries went unanswered, polling again");
            self.pending.clear();
        }
        self.poll(contacts)
    }

    fn poll_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }
}
