//! In-memory collection of submitted messages and their delivery records.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::{DateTime, Local};
use thiserror::Error;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageId, MessageStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown message {0}")]
    UnknownMessage(MessageId),
    #[error("message {0} already completed")]
    AlreadyCompleted(MessageId),
    #[error("message {0} cannot complete with a pending status")]
    NotTerminal(MessageId),
}

/// Consistent copy of one tracked message.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub to: String,
    pub from: String,
    pub subject: String,
    pub server: Option<String>,
    pub status: MessageStatus,
    pub submitted_at: DateTime<Local>,
    pub delivered_at: Option<DateTime<Local>>,
}

#[derive(Debug)]
struct DeliveryRecord {
    status: MessageStatus,
    delivered_at: Option<DateTime<Local>>,
}

#[derive(Debug)]
pub(crate) struct TrackedMessage {
    id: MessageId,
    message: Message,
    record: Mutex<DeliveryRecord>,
}

impl TrackedMessage {
    pub(crate) fn id(&self) -> MessageId {
        self.id
    }

    pub(crate) fn message(&self) -> &Message {
        &self.message
    }

    fn record(&self) -> MutexGuard<'_, DeliveryRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn status(&self) -> MessageStatus {
        self.record().status.clone()
    }

    fn snapshot(&self) -> MessageSnapshot {
        let (status, delivered_at) = {
            let record = self.record();
            (record.status.clone(), record.delivered_at)
        };
        MessageSnapshot {
            id: self.id,
            to: self.message.to().to_string(),
            from: self.message.from().to_string(),
            subject: self.message.subject().to_string(),
            server: self.message.server().map(str::to_string),
            status,
            submitted_at: self.message.submitted_at(),
            delivered_at,
        }
    }
}

/// Ordered, id-indexed message collection.
///
/// Ids are allocated sequentially from 1, so a message's position in the
/// list is `id - 1`. Each delivery record sits behind its own mutex and a
/// reader always observes the status and delivery time together.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: RwLock<Vec<Arc<TrackedMessage>>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` with a `Pending` status and returns its new id.
    pub fn add(&self, message: Message) -> MessageId {
        let mut messages = self.messages.write().unwrap_or_else(PoisonError::into_inner);
        let id = MessageId(messages.len() as u64 + 1);
        messages.push(Arc::new(TrackedMessage {
            id,
            message,
            record: Mutex::new(DeliveryRecord {
                status: MessageStatus::Pending,
                delivered_at: None,
            }),
        }));
        id
    }

    pub fn get(&self, id: MessageId) -> Option<MessageSnapshot> {
        self.tracked(id).map(|tracked| tracked.snapshot())
    }

    pub fn status(&self, id: MessageId) -> Option<MessageStatus> {
        self.tracked(id).map(|tracked| tracked.status())
    }

    /// Every message in id order.
    pub fn all(&self) -> Vec<MessageSnapshot> {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        messages.iter().map(|tracked| tracked.snapshot()).collect()
    }

    pub fn len(&self) -> usize {
        self.messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_count(&self) -> usize {
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        messages
            .iter()
            .filter(|tracked| tracked.status().is_pending())
            .count()
    }

    pub(crate) fn tracked(&self, id: MessageId) -> Option<Arc<TrackedMessage>> {
        let index = usize::try_from(id.0.checked_sub(1)?).ok()?;
        let messages = self.messages.read().unwrap_or_else(PoisonError::into_inner);
        messages.get(index).cloned()
    }

    /// Records the terminal outcome of a delivery.
    pub(crate) fn complete(
        &self,
        id: MessageId,
        status: MessageStatus,
        at: DateTime<Local>,
    ) -> Result<(), StoreError> {
        if status.is_pending() {
            return Err(StoreError::NotTerminal(id));
        }
        let tracked = self.tracked(id).ok_or(StoreError::UnknownMessage(id))?;
        let mut record = tracked.record();
        if record.status.is_terminal() {
            return Err(StoreError::AlreadyCompleted(id));
        }
        record.status = status;
        record.delivered_at = Some(at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn message(subject: &str) -> Message {
        Message::new("rcpt@example.com", "sender@example.org", subject, "body")
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let store = MessageStore::new();
        assert!(store.is_empty());
        let first = store.add(message("one"));
        let second = store.add(message("two"));
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
        assert_eq!(store.len(), 2);

        let all = store.all();
        assert_eq!(all[0].subject, "one");
        assert_eq!(all[1].subject, "two");
        assert_eq!(store.get(MessageId(0)), None);
        assert_eq!(store.get(MessageId(3)), None);
    }

    #[test]
    fn complete_sets_status_and_time_once() {
        let store = MessageStore::new();
        let id = store.add(message("s"));
        let snapshot = store.get(id).expect("present");
        assert_eq!(snapshot.status, MessageStatus::Pending);
        assert_eq!(snapshot.delivered_at, None);
        assert_eq!(store.pending_count(), 1);

        let at = Local::now();
        store
            .complete(id, MessageStatus::failure("boom"), at)
            .expect("first completion");
        let snapshot = store.get(id).expect("present");
        assert_eq!(snapshot.status, MessageStatus::failure("boom"));
        assert_eq!(snapshot.delivered_at, Some(at));
        assert_eq!(store.pending_count(), 0);

        let err = store
            .complete(id, MessageStatus::Success, Local::now())
            .expect_err("second completion");
        assert_eq!(err, StoreError::AlreadyCompleted(id));
        assert_eq!(store.status(id), Some(MessageStatus::failure("boom")));
    }

    #[test]
    fn complete_rejects_pending_and_unknown() {
        let store = MessageStore::new();
        let id = store.add(message("s"));
        assert_eq!(
            store.complete(id, MessageStatus::Pending, Local::now()),
            Err(StoreError::NotTerminal(id))
        );
        assert_eq!(
            store.complete(MessageId(9), MessageStatus::Success, Local::now()),
            Err(StoreError::UnknownMessage(MessageId(9)))
        );
    }

    #[test]
    fn readers_never_see_torn_records() {
        let store = Arc::new(MessageStore::new());
        let ids: Vec<_> = (0..64).map(|i| store.add(message(&i.to_string()))).collect();

        let writer = {
            let store = Arc::clone(&store);
            let ids = ids.clone();
            thread::spawn(move || {
                for id in ids {
                    store
                        .complete(id, MessageStatus::Success, Local::now())
                        .expect("complete");
                }
            })
        };

        for _ in 0..50 {
            for snapshot in store.all() {
                assert_eq!(snapshot.status.is_terminal(), snapshot.delivered_at.is_some());
            }
        }
        writer.join().expect("writer thread");
        assert_eq!(store.pending_count(), 0);
    }
}
