//! Registry of inbound message handlers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::domain::relay::RelayMessage;

/// Callback invoked for each matching inbound message.
pub type MessageCallback = Arc<dyn Fn(&RelayMessage) + Send + Sync>;

struct Handler {
    /// `None` accepts every kind.
    kinds: Option<Vec<String>>,
    callback: MessageCallback,
}

impl Handler {
    fn accepts(&self, message: &RelayMessage) -> bool {
        match &self.kinds {
            None => true,
            Some(kinds) => kinds.iter().any(|kind| *kind == message.kind),
        }
    }
}

#[derive(Default)]
pub(crate) struct HandlerRegistry {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<u64, Handler>>,
}

impl HandlerRegistry {
    pub(crate) fn register(
        self: &Arc<Self>,
        kinds: Option<Vec<String>>,
        callback: MessageCallback,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, Handler { kinds, callback });
        Subscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    /// Calls every matching handler; returns how many ran.
    ///
    /// Callbacks run outside the lock, so a callback may subscribe or
    /// unsubscribe without deadlocking.
    pub(crate) fn dispatch(&self, message: &RelayMessage) -> usize {
        let matching: Vec<MessageCallback> = self
            .lock()
            .values()
            .filter(|handler| handler.accepts(message))
            .map(|handler| handler.callback.clone())
            .collect();

        for callback in &matching {
            callback(message);
        }
        matching.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn remove(&self, id: u64) {
        self.lock().remove(&id);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, Handler>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a handler registered. Dropping it, or calling
/// [`Subscription::unsubscribe`], removes the handler.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<HandlerRegistry>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
