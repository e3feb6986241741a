//! # Subscription Bindings
//!
//! A binding keeps a live, deserialized view of one key's value for one
//! observer, kept current across both notification kinds, with full
//! teardown and re-initialization when the watched key changes.
//!
//! Cross-context deletions are asymmetric on purpose: a native signal whose
//! new value is the absence marker leaves the cached value in place, while
//! an in-context deletion moves the cache to the empty-string sentinel.
//! Observers that need deletions to clear dependent state must route them
//! through the explicit delete path in their own context.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde_json::Value;

use crate::channel::{EventChannel, ListenerId, StorageEvent};
use crate::codec;

use super::errors::SyncResult;
use super::facade::StorageFacade;

type ValueCache = Arc<RwLock<Option<Value>>>;

/// Per-key, per-observer subscription.
///
/// Created by [`Context::subscribe`](super::Context::subscribe) (or
/// directly over a facade). Holds its own cached copy of the last-seen
/// value, never shared with other bindings, plus the two listener handles
/// (one per notification kind). Dropping the binding unregisters both
/// listeners synchronously.
pub struct SubscriptionBinding {
    key: String,
    default: Option<Value>,
    cache: ValueCache,
    facade: StorageFacade,
    local_listener: ListenerId,
    native_listener: ListenerId,
}

impl SubscriptionBinding {
    /// Activate a binding for `key`.
    ///
    /// Reads the current store state; when the key is absent and a default
    /// is supplied, the default is written through the facade exactly once,
    /// seeding the store for other observers and contexts.
    ///
    /// # Errors
    ///
    /// Store read failures and seed-write failures propagate; on error no
    /// listeners remain registered.
    pub fn new(facade: StorageFacade, key: &str, default: Option<Value>) -> SyncResult<Self> {
        let cache: ValueCache = Arc::new(RwLock::new(None));
        let (local_listener, native_listener) = Self::register(facade.channel(), key, &cache);

        let binding = Self {
            key: key.to_string(),
            default,
            cache,
            facade,
            local_listener,
            native_listener,
        };
        binding.initialize()?;
        Ok(binding)
    }

    /// Registers the two listeners, one per notification kind. Both filter
    /// on the watched key and write into the binding's cache.
    fn register(
        channel: &Arc<EventChannel>,
        key: &str,
        cache: &ValueCache,
    ) -> (ListenerId, ListenerId) {
        let local_listener = {
            let key = key.to_string();
            let cache = Arc::clone(cache);
            channel.subscribe(move |event| {
                if let StorageEvent::Local(change) = event {
                    if change.key == key {
                        if let Ok(mut cached) = cache.write() {
                            *cached = Some(change.value.clone());
                        }
                    }
                }
            })
        };

        let native_listener = {
            let key = key.to_string();
            let cache = Arc::clone(cache);
            channel.subscribe(move |event| {
                if let StorageEvent::Remote(change) = event {
                    if change.key == key {
                        // Absence marker: keep the last value (see module docs).
                        if let Some(raw) = &change.new_value {
                            if let Ok(mut cached) = cache.write() {
                                *cached = Some(codec::decode(raw));
                            }
                        }
                    }
                }
            })
        };

        (local_listener, native_listener)
    }

    /// Reads current store state into the cache, seeding the store with
    /// the default when the key is absent.
    fn initialize(&self) -> SyncResult<()> {
        let stored = self.facade.read_raw(&self.key)?;

        match stored {
            Some(raw) => self.store_cache(Some(codec::decode(&raw))),
            None => {
                self.store_cache(self.default.clone());
                if let Some(default) = &self.default {
                    self.facade.write_value(&self.key, default.clone())?;
                }
            }
        }
        Ok(())
    }

    fn store_cache(&self, value: Option<Value>) {
        if let Ok(mut cached) = self.cache.write() {
            *cached = value;
        }
    }

    /// The watched key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The cached deserialized value; `None` means the key was absent when
    /// last observed.
    pub fn value(&self) -> Option<Value> {
        self.cache.read().ok().and_then(|cached| cached.clone())
    }

    /// Write `value` under the watched key through the facade.
    pub fn set<T: Serialize>(&self, value: &T) -> SyncResult<()> {
        self.facade.write(&self.key, value)
    }

    /// Remove the watched key through the facade.
    pub fn delete(&self) -> SyncResult<()> {
        self.facade.remove(&self.key)
    }

    /// Switch the binding to a different key.
    ///
    /// The old listeners are unregistered first, then the activation cycle
    /// (store read, default seeding, listener registration) restarts for
    /// the new key. A no-op when the key is unchanged.
    pub fn rebind(&mut self, new_key: &str) -> SyncResult<()> {
        if new_key == self.key {
            return Ok(());
        }

        let channel = Arc::clone(self.facade.channel());
        channel.unsubscribe(&self.local_listener);
        channel.unsubscribe(&self.native_listener);

        self.key = new_key.to_string();
        self.store_cache(None);

        let (local_listener, native_listener) = Self::register(&channel, new_key, &self.cache);
        self.local_listener = local_listener;
        self.native_listener = native_listener;

        self.initialize()
    }

    /// Tear the binding down.
    ///
    /// Listener unregistration is synchronous: no notification is
    /// delivered once this returns. Dropping the binding has the same
    /// effect.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for SubscriptionBinding {
    fn drop(&mut self) {
        let channel = self.facade.channel();
        channel.unsubscribe(&self.local_listener);
        channel.unsubscribe(&self.native_listener);
    }
}
