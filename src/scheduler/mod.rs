//! Immediate and delayed delivery of submitted messages.
//!
//! [`DeliveryScheduler::submit`] records every message in the
//! [`MessageStore`] first. Without a delay the delivery runs on the calling
//! thread; otherwise a worker thread sleeps on a cancellation channel and
//! delivers once the delay expires. Each delayed send is claimed exactly
//! once, either by its worker or by [`DeliveryScheduler::cancel`].

mod error;
mod mailer;
mod options;

pub use error::DeliveryError;
pub use mailer::Mailer;
pub use options::DeliveryOptions;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use tracing::{debug, info, warn};

use crate::message::{Message, MessageId, MessageStatus};
use crate::session::{Connector, TcpConnector};
use crate::store::MessageStore;

/// Status reported to a cancelled delayed send.
pub const CANCELLED_STATUS: &str = "Delivery cancelled";

/// Outcome of [`DeliveryScheduler::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: MessageId,
    /// Terminal for immediate sends, `Pending` for delayed ones.
    pub status: MessageStatus,
}

struct PendingDelivery {
    claimed: Arc<AtomicBool>,
    wake: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

struct Inner<C: Connector> {
    mailer: Mailer<C>,
    store: Arc<MessageStore>,
    pending: Mutex<HashMap<MessageId, PendingDelivery>>,
}

pub struct DeliveryScheduler<C: Connector + 'static = TcpConnector> {
    inner: Arc<Inner<C>>,
}

impl DeliveryScheduler {
    pub fn new(options: DeliveryOptions) -> Self {
        Self::with_mailer(Mailer::new(options))
    }
}

impl Default for DeliveryScheduler {
    fn default() -> Self {
        Self::new(DeliveryOptions::default())
    }
}

impl<C: Connector + 'static> DeliveryScheduler<C> {
    pub fn with_mailer(mailer: Mailer<C>) -> Self {
        Self::with_store(mailer, Arc::new(MessageStore::new()))
    }

    pub fn with_store(mailer: Mailer<C>, store: Arc<MessageStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                mailer,
                store,
                pending: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn store(&self) -> &Arc<MessageStore> {
        &self.inner.store
    }

    pub fn mailer(&self) -> &Mailer<C> {
        &self.inner.mailer
    }

    pub fn status(&self, id: MessageId) -> Option<MessageStatus> {
        self.inner.store.status(id)
    }

    /// Delayed sends whose worker has not finished yet.
    pub fn pending_deliveries(&self) -> usize {
        self.inner.pending().len()
    }

    /// Stores `message` and delivers it now (`delay` of zero) or after `delay`.
    pub fn submit(&self, message: Message, delay: Duration) -> Submission {
        let id = self.inner.store.add(message);
        if delay.is_zero() {
            let status = self.inner.run(id);
            return Submission { id, status };
        }

        let claimed = Arc::new(AtomicBool::new(false));
        let (wake, cancelled) = mpsc::channel();

        let mut pending = self.inner.pending();
        let inner = Arc::clone(&self.inner);
        let worker_claim = Arc::clone(&claimed);
        let spawned = thread::Builder::new()
            .name(format!("directmail-delivery-{id}"))
            .spawn(move || inner.delayed(id, delay, cancelled, worker_claim));

        match spawned {
            Ok(handle) => {
                pending.insert(
                    id,
                    PendingDelivery {
                        claimed,
                        wake,
                        handle: Some(handle),
                    },
                );
                info!(%id, ?delay, "delivery scheduled");
                Submission {
                    id,
                    status: MessageStatus::Pending,
                }
            }
            Err(err) => {
                drop(pending);
                let status = MessageStatus::failure(format!("Could not schedule delivery ({err})"));
                let status = self.inner.complete(id, status);
                Submission { id, status }
            }
        }
    }

    /// Cancels a delayed send that has not fired yet. Returns `false` when
    /// there is nothing left to cancel.
    pub fn cancel(&self, id: MessageId) -> bool {
        let entry = {
            let mut pending = self.inner.pending();
            let Some(entry) = pending.get(&id) else {
                return false;
            };
            if entry
                .claimed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return false;
            }
            pending.remove(&id)
        };

        self.inner.complete(id, MessageStatus::failure(CANCELLED_STATUS));
        info!(%id, "delivery cancelled");

        if let Some(mut entry) = entry {
            entry.wake.send(()).ok();
            if let Some(handle) = entry.handle.take() {
                handle.join().ok();
            }
        }
        true
    }

    /// Blocks until every delayed send scheduled so far has finished.
    pub fn wait_all(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut pending = self.inner.pending();
                pending
                    .values_mut()
                    .filter_map(|entry| entry.handle.take())
                    .collect()
            };
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if handle.join().is_err() {
                    warn!("delivery worker panicked");
                }
            }
        }
    }
}

impl<C: Connector> Inner<C> {
    fn pending(&self) -> MutexGuard<'_, HashMap<MessageId, PendingDelivery>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Delivers message `id` and records the outcome.
    fn run(&self, id: MessageId) -> MessageStatus {
        let Some(tracked) = self.store.tracked(id) else {
            return MessageStatus::failure(format!("unknown message {id}"));
        };
        let status = self.mailer.deliver(tracked.message());
        self.complete(tracked.id(), status)
    }

    /// Records a terminal status and returns the one actually stored.
    fn complete(&self, id: MessageId, status: MessageStatus) -> MessageStatus {
        match self.store.complete(id, status.clone(), Local::now()) {
            Ok(()) => status,
            Err(err) => {
                warn!(%id, error = %err, "delivery outcome not recorded");
                self.store.status(id).unwrap_or(status)
            }
        }
    }

    fn delayed(
        &self,
        id: MessageId,
        delay: Duration,
        cancelled: Receiver<()>,
        claimed: Arc<AtomicBool>,
    ) {
        match cancelled.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
        }
        if claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        debug!(%id, "delayed delivery firing");
        let status = self.run(id);
        self.notify(id, &status);
        self.pending().remove(&id);
    }

    /// Tells the original sender how a delayed delivery went. Best effort.
    fn notify(&self, id: MessageId, status: &MessageStatus) {
        let Some(tracked) = self.store.tracked(id) else {
            return;
        };
        let original = tracked.message();
        let notice = Message::new(
            original.from(),
            &self.mailer.options().notification_sender,
            format!("Your email: {}", original.subject()),
            format!("The status of your email is: {status}"),
        );
        match self.mailer.send(&notice) {
            Ok(()) => debug!(%id, to = original.from(), "status notification sent"),
            Err(err) => debug!(%id, error = %err, "status notification discarded"),
        }
    }
}
