//! Named-event subscriptions
//!
//! Handlers are keyed by bus message type and invoked on the network
//! thread, in subscription order.

use crate::message::Message;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Callback invoked for every matching inbound message
pub type Handler = Arc<dyn Fn(&Message) + Send + Sync>;

/// Token returned by `subscribe`; pass it back to unsubscribe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    event: String,
    id: u64,
}

impl SubscriptionHandle {
    /// Event name this handle is subscribed to
    pub fn event(&self) -> &str {
        &self.event
    }
}

/// Registry of event handlers
#[derive(Default)]
pub struct EventRegistry {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<String, Vec<(u64, Handler)>>>,
}

impl EventRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for messages of type `event`
    pub fn subscribe(&self, event: &str, handler: Handler) -> SubscriptionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        SubscriptionHandle {
            event: event.to_string(),
            id,
        }
    }

    /// Remove a subscription; returns false if it was already gone
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        let Some(list) = handlers.get_mut(&handle.event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != handle.id);
        let removed = list.len() != before;
        if list.is_empty() {
            handlers.remove(&handle.event);
        }
        removed
    }

    /// Invoke every handler subscribed to `message.msg_type`
    ///
    /// Returns the number of handlers called.
    pub fn dispatch(&self, message: &Message) -> usize {
        // Clone out so handlers may (un)subscribe without deadlocking.
        let matching: Vec<Handler> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&message.msg_type)
            .map(|list| list.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default();

        for handler in &matching {
            handler(message);
        }
        matching.len()
    }

    /// Number of handlers registered for `event`
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(event)
            .map_or(0, Vec::len)
    }
}
