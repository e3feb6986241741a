//! # Execution Contexts
//!
//! One `Context` models one isolated execution environment: its own event
//! channel and listener registry, a per-context handle onto the shared
//! store, and the public write / remove / subscribe surface. Sibling
//! contexts attached to the same hub share the store but not the channel.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::channel::{EventChannel, StorageEvent};
use crate::store::{Store, StoreHub};

use super::errors::SyncResult;
use super::facade::StorageFacade;
use super::subscription::SubscriptionBinding;

/// One execution context over a (possibly shared) store.
pub struct Context {
    channel: Arc<EventChannel>,
    facade: StorageFacade,
}

impl Context {
    /// Attach a new context to a hub.
    ///
    /// The context's ingest boundary classifies the hub's untyped native
    /// payloads into [`StorageEvent`]s and rebroadcasts them on the
    /// context's own channel; unrecognized payloads are dropped.
    pub fn attach(hub: &Arc<StoreHub>) -> Self {
        let channel = Arc::new(EventChannel::new());

        let ingest = {
            let channel = Arc::clone(&channel);
            move |raw: &Value| {
                if let Some(event) = StorageEvent::from_wire(raw) {
                    channel.broadcast(&event);
                }
            }
        };

        let store = StoreHub::attach(hub, ingest);
        let facade = StorageFacade::new(Arc::new(store), Arc::clone(&channel));

        Self { channel, facade }
    }

    /// Create a context directly over a store, without a hub.
    ///
    /// For single-context use: no native signals will ever arrive, and
    /// only the in-context notification kind is observed.
    pub fn standalone(store: Arc<dyn Store>) -> Self {
        let channel = Arc::new(EventChannel::new());
        let facade = StorageFacade::new(store, Arc::clone(&channel));
        Self { channel, facade }
    }

    /// Write `value` under `key`. See [`StorageFacade::write`].
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> SyncResult<()> {
        self.facade.write(key, value)
    }

    /// Remove `key`. See [`StorageFacade::remove`].
    pub fn remove(&self, key: &str) -> SyncResult<()> {
        self.facade.remove(key)
    }

    /// Read and decode the current value for `key`.
    pub fn read(&self, key: &str) -> SyncResult<Option<Value>> {
        self.facade.read(key)
    }

    /// Begin watching `key`.
    ///
    /// The returned binding is initialized from current store state (with
    /// `default` seeding an absent key), stays current across both
    /// notification kinds, and exposes mutators bound to the key.
    pub fn subscribe(
        &self,
        key: &str,
        default: Option<Value>,
    ) -> SyncResult<SubscriptionBinding> {
        SubscriptionBinding::new(self.facade.clone(), key, default)
    }

    /// This context's event channel.
    pub fn channel(&self) -> &Arc<EventChannel> {
        &self.channel
    }

    /// This context's storage facade.
    pub fn facade(&self) -> &StorageFacade {
        &self.facade
    }
}
