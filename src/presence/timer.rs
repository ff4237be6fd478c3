//! Driving the polling tick from a tokio interval.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::ContactList;
use crate::message::Message;

/// A [`ContactList`] shared between the application and the poll timer.
/// Contact mutation and ticks take the same lock.
#[derive(Clone, Debug)]
pub struct SharedContacts(Arc<Mutex<ContactList>>);

impl SharedContacts {
    pub fn new(list: ContactList) -> Self {
        SharedContacts(Arc::new(Mutex::new(list)))
    }

    pub fn lock(&self) -> MutexGuard<'_, ContactList> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<ContactList> for SharedContacts {
    fn from(list: ContactList) -> Self {
        Self::new(list)
    }
}

/// Tick the list's strategy every poll interval and forward the resulting
/// lines to `outgoing`.
///
/// Returns `None` when the strategy does not poll. The task ends when
/// `outgoing` is closed or the handle is aborted.
pub fn spawn_poll_timer(
    contacts: SharedContacts,
    outgoing: mpsc::UnboundedSender<Message>,
) -> Option<JoinHandle<()>> {
    let period = contacts.lock().poll_interval()?;
    Some(tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let lines = contacts.lock().tick();
            for line in lines {
                if outgoing.send(line).is_err() {
                    debug!("poll timer receiver dropped, stopping");
                    return;
                }
            }
            if outgoing.is_closed() {
                return;
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::casemap::CaseMapping;
    use crate::presence::{IsonStrategy, PollingConfig, WatchStrategy};

    #[tokio::test]
    async fn polls_on_interval() {
        let strategy = IsonStrategy::new(PollingConfig {
            interval: Duration::from_millis(20),
        });
        let shared = SharedContacts::new(ContactList::with_strategy(Box::new(strategy), CaseMapping::Ascii));
        shared.lock().add("alice");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_poll_timer(shared.clone(), tx).unwrap();
        let line = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.to_string(), "ISON alice");
        handle.abort();
    }

    #[tokio::test]
    async fn push_strategies_need_no_timer() {
        let shared = SharedContacts::new(ContactList::with_strategy(
            Box::new(WatchStrategy::new(10)),
            CaseMapping::Ascii,
        ));
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(spawn_poll_timer(shared, tx).is_none());
    }
}
