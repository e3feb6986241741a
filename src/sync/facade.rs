//! # Storage Facade
//!
//! The sanctioned entry point for mutating the store. Every successful
//! mutation is paired with exactly one in-context broadcast, in
//! mutation-then-broadcast order; if the store rejects the mutation, no
//! broadcast occurs.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::channel::{ChangeNotification, EventChannel, StorageEvent};
use crate::codec;
use crate::store::Store;

use super::errors::{SyncError, SyncResult};

/// Mutation entry point bound to one context's store handle and channel.
///
/// Cheap to clone; clones share the same store and channel.
#[derive(Clone)]
pub struct StorageFacade {
    store: Arc<dyn Store>,
    channel: Arc<EventChannel>,
}

impl StorageFacade {
    /// Create a facade over a store handle and an event channel.
    pub fn new(store: Arc<dyn Store>, channel: Arc<EventChannel>) -> Self {
        Self { store, channel }
    }

    /// The channel this facade broadcasts on.
    pub fn channel(&self) -> &Arc<EventChannel> {
        &self.channel
    }

    /// Serialize `value`, persist it under `key`, then broadcast the
    /// change to in-context listeners.
    ///
    /// The broadcast carries the pre-serialization logical value, so
    /// in-context observers skip a redundant decode.
    ///
    /// # Errors
    ///
    /// [`SyncError::EmptyKey`] for an empty key;
    /// [`SyncError::Serialization`] when the value cannot be encoded
    /// (nothing is persisted, nothing is broadcast);
    /// [`SyncError::Store`] when the store rejects the write (nothing is
    /// broadcast).
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> SyncResult<()> {
        let value = codec::to_value(value)?;
        self.write_value(key, value)
    }

    /// [`StorageFacade::write`] for an already-logical value.
    pub fn write_value(&self, key: &str, value: Value) -> SyncResult<()> {
        if key.is_empty() {
            return Err(SyncError::EmptyKey);
        }

        let raw = codec::encode(&value);
        self.store.set(key, &raw)?;
        self.channel
            .broadcast(&StorageEvent::Local(ChangeNotification::new(key, value)));
        Ok(())
    }

    /// Remove `key` from the store, then broadcast the deletion
    /// (empty-string sentinel) to in-context listeners.
    ///
    /// Removing a missing key is a no-op in the store but still
    /// broadcasts, so observers of the key settle on the sentinel.
    pub fn remove(&self, key: &str) -> SyncResult<()> {
        self.store.remove(key)?;
        self.channel
            .broadcast(&StorageEvent::Local(ChangeNotification::deleted(key)));
        Ok(())
    }

    /// Read and decode the current value for `key`.
    pub fn read(&self, key: &str) -> SyncResult<Option<Value>> {
        Ok(self.store.get(key)?.map(|raw| codec::decode(&raw)))
    }

    /// Read the raw stored string for `key`.
    pub fn read_raw(&self, key: &str) -> SyncResult<Option<String>> {
        Ok(self.store.get(key)?)
    }
}
