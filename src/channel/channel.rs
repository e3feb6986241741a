//! # Event Channel
//!
//! Explicit, injectable pub/sub service carrying key-change events to every
//! listener in one execution context. Created once per context; listeners are
//! added and removed explicitly, and tests can construct independent
//! instances instead of sharing a hidden global registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use super::event::StorageEvent;

/// Handle identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

type ListenerFn = dyn Fn(&StorageEvent) + Send + Sync;

#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    /// Cleared on unsubscribe so a fan-out already in flight skips the entry.
    active: Arc<AtomicBool>,
    callback: Arc<ListenerFn>,
}

/// Process-wide broadcast medium for one execution context.
///
/// Delivery is synchronous: every listener registered at call time is invoked
/// in registration order before [`EventChannel::broadcast`] returns. The
/// channel holds no state beyond its listener registry; it is a broadcast
/// medium, not a holder of values.
#[derive(Default)]
pub struct EventChannel {
    listeners: RwLock<Vec<ListenerEntry>>,
}

impl EventChannel {
    /// Create a channel with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Registration is infallible.
    ///
    /// The listener is invoked for every broadcast until unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&StorageEvent) + Send + Sync + 'static,
    {
        let entry = ListenerEntry {
            id: ListenerId::generate(),
            active: Arc::new(AtomicBool::new(true)),
            callback: Arc::new(listener),
        };
        let id = entry.id;

        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push(entry);
        }

        id
    }

    /// Remove a listener.
    ///
    /// Synchronous: once this returns, the listener is never invoked again,
    /// including by a broadcast already fanning out on the same thread.
    /// Returns whether the listener was registered.
    pub fn unsubscribe(&self, id: &ListenerId) -> bool {
        if let Ok(mut listeners) = self.listeners.write() {
            if let Some(position) = listeners.iter().position(|entry| entry.id == *id) {
                let entry = listeners.remove(position);
                entry.active.store(false, Ordering::SeqCst);
                return true;
            }
        }
        false
    }

    /// Deliver an event to every listener registered at call time, in
    /// registration order, before returning.
    ///
    /// No queuing and no persistence. Listeners registered during the
    /// fan-out do not observe the current event; listeners unregistered
    /// during the fan-out are skipped.
    pub fn broadcast(&self, event: &StorageEvent) {
        let snapshot: Vec<ListenerEntry> = match self.listeners.read() {
            Ok(listeners) => listeners.clone(),
            Err(_) => return,
        };

        for entry in snapshot {
            if entry.active.load(Ordering::SeqCst) {
                (entry.callback)(event);
            }
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::event::ChangeNotification;
    use serde_json::json;
    use std::sync::Mutex;

    fn local_event(key: &str, value: serde_json::Value) -> StorageEvent {
        StorageEvent::Local(ChangeNotification::new(key, value))
    }

    #[test]
    fn test_broadcast_reaches_all_listeners_in_registration_order() {
        let channel = EventChannel::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            channel.subscribe(move |_| order.lock().unwrap().push(tag));
        }

        channel.broadcast(&local_event("k", json!(1)));

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_broadcast_completes_before_returning() {
        let channel = EventChannel::new();
        let seen = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&seen);
        channel.subscribe(move |event| {
            *sink.lock().unwrap() = Some(event.clone());
        });

        channel.broadcast(&local_event("count", json!(2)));

        // Synchronous fan-out: the listener already ran.
        assert_eq!(
            *seen.lock().unwrap(),
            Some(local_event("count", json!(2)))
        );
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let channel = EventChannel::new();
        let hits = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&hits);
        let id = channel.subscribe(move |_| *sink.lock().unwrap() += 1);

        channel.broadcast(&local_event("k", json!(1)));
        assert!(channel.unsubscribe(&id));
        channel.broadcast(&local_event("k", json!(2)));

        assert_eq!(*hits.lock().unwrap(), 1);
        assert_eq!(channel.listener_count(), 0);
    }

    #[test]
    fn test_unsubscribe_unknown_listener_returns_false() {
        let channel = EventChannel::new();
        let other = EventChannel::new();
        let id = other.subscribe(|_| {});
        assert!(!channel.unsubscribe(&id));
    }

    #[test]
    fn test_listener_unregistered_mid_fanout_is_skipped() {
        let channel = Arc::new(EventChannel::new());
        let hits = Arc::new(Mutex::new(0));

        // The second listener's id is fixed up after registration.
        let victim: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        {
            let channel = Arc::clone(&channel);
            let victim = Arc::clone(&victim);
            channel.clone().subscribe(move |_| {
                if let Some(id) = *victim.lock().unwrap() {
                    channel.unsubscribe(&id);
                }
            });
        }
        {
            let sink = Arc::clone(&hits);
            let id = channel.subscribe(move |_| *sink.lock().unwrap() += 1);
            *victim.lock().unwrap() = Some(id);
        }

        // The first listener tears the second down while the fan-out for
        // this broadcast is in flight; the second must not be invoked.
        channel.broadcast(&local_event("k", json!(1)));
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_listener_registered_mid_fanout_misses_current_event() {
        let channel = Arc::new(EventChannel::new());
        let late_hits = Arc::new(Mutex::new(0));

        {
            let channel = Arc::clone(&channel);
            let late_hits = Arc::clone(&late_hits);
            channel.clone().subscribe(move |_| {
                let sink = Arc::clone(&late_hits);
                channel.subscribe(move |_| *sink.lock().unwrap() += 1);
            });
        }

        channel.broadcast(&local_event("k", json!(1)));
        assert_eq!(*late_hits.lock().unwrap(), 0);

        // The late listener does observe the next broadcast.
        channel.broadcast(&local_event("k", json!(2)));
        assert_eq!(*late_hits.lock().unwrap(), 1);
    }

    #[test]
    fn test_independent_channels_are_isolated() {
        let a = EventChannel::new();
        let b = EventChannel::new();
        let hits = Arc::new(Mutex::new(0));

        let sink = Arc::clone(&hits);
        a.subscribe(move |_| *sink.lock().unwrap() += 1);

        b.broadcast(&local_event("k", json!(1)));
        assert_eq!(*hits.lock().unwrap(), 0);
    }

    #[test]
    fn test_broadcast_with_no_listeners_is_a_no_op() {
        let channel = EventChannel::new();
        channel.broadcast(&local_event("k", json!(1)));
        assert_eq!(channel.listener_count(), 0);
    }
}
