//! Shared store hub with native cross-context change signals.
//!
//! The hub owns the store shared by every attached context and plays the
//! role of the platform storage layer: each successful mutation through a
//! context's handle is fanned out to the other attached contexts as an
//! untyped wire payload (the native notification). Delivery is best-effort
//! and synchronous, with no ordering guarantee across contexts.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use uuid::Uuid;

use crate::channel::NativeChangeNotification;
use crate::observability::{Logger, Severity};

use super::errors::StoreResult;
use super::Store;

/// Hub behavior knobs.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Whether the writer's own context also receives the native signal.
    ///
    /// Off by default: the writer's context is already informed by its
    /// in-context broadcast, and observers adopt an echoed value
    /// idempotently when this is on.
    pub echo_to_writer: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            echo_to_writer: false,
        }
    }
}

type NativeSink = dyn Fn(&Value) + Send + Sync;

#[derive(Clone)]
struct Endpoint {
    id: Uuid,
    sink: Arc<NativeSink>,
}

/// Shared backing store plus the registry of attached contexts.
pub struct StoreHub {
    backing: Arc<dyn Store>,
    endpoints: RwLock<Vec<Endpoint>>,
    config: HubConfig,
}

impl StoreHub {
    /// Create a hub over a backing store with default config.
    pub fn new(backing: Arc<dyn Store>) -> Self {
        Self::with_config(backing, HubConfig::default())
    }

    /// Create a hub with explicit config.
    pub fn with_config(backing: Arc<dyn Store>, config: HubConfig) -> Self {
        Self {
            backing,
            endpoints: RwLock::new(Vec::new()),
            config,
        }
    }

    /// Attach a context: registers its native-signal sink and returns the
    /// per-context store handle. Mutations through the handle reach the
    /// shared backing store and trigger the native signal in siblings.
    pub fn attach<F>(hub: &Arc<Self>, sink: F) -> ContextStore
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();

        if let Ok(mut endpoints) = hub.endpoints.write() {
            endpoints.push(Endpoint {
                id,
                sink: Arc::new(sink),
            });
        }

        Logger::log(
            Severity::Trace,
            "context_attached",
            &[("context_id", &id.to_string())],
        );

        ContextStore {
            hub: Arc::clone(hub),
            context_id: id,
        }
    }

    /// Detach a context. Synchronous: once this returns, the context's
    /// sink receives no further signals.
    pub fn detach(&self, context_id: Uuid) {
        if let Ok(mut endpoints) = self.endpoints.write() {
            endpoints.retain(|endpoint| endpoint.id != context_id);
        }

        Logger::log(
            Severity::Trace,
            "context_detached",
            &[("context_id", &context_id.to_string())],
        );
    }

    /// Number of attached contexts.
    pub fn context_count(&self) -> usize {
        self.endpoints.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Fans the native change signal out to attached contexts.
    fn notify(
        &self,
        writer: Uuid,
        key: &str,
        new_value: Option<&str>,
        old_value: Option<String>,
    ) {
        let wire = NativeChangeNotification::new(
            key,
            new_value.map(str::to_string),
            old_value,
        )
        .to_wire();

        let snapshot: Vec<Endpoint> = match self.endpoints.read() {
            Ok(endpoints) => endpoints.clone(),
            Err(_) => return,
        };

        let mut delivered = 0usize;
        for endpoint in snapshot {
            if endpoint.id != writer || self.config.echo_to_writer {
                (endpoint.sink)(&wire);
                delivered += 1;
            }
        }

        Logger::log(
            Severity::Trace,
            "native_signal_dispatched",
            &[("delivered", &delivered.to_string()), ("key", key)],
        );
    }
}

/// Per-context handle onto the shared store.
///
/// Implements [`Store`]; reads pass straight through, mutations trigger
/// the hub's native signal in sibling contexts after the backing store
/// succeeds. Dropping the handle detaches the context.
pub struct ContextStore {
    hub: Arc<StoreHub>,
    context_id: Uuid,
}

impl ContextStore {
    /// Identity of the attached context.
    pub fn context_id(&self) -> Uuid {
        self.context_id
    }
}

impl Store for ContextStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.hub.backing.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let old_value = self.hub.backing.get(key)?;
        self.hub.backing.set(key, value)?;
        self.hub.notify(self.context_id, key, Some(value), old_value);
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let old_value = self.hub.backing.get(key)?;
        self.hub.backing.remove(key)?;

        // Removing a missing key mutates nothing, so no signal fires.
        if old_value.is_some() {
            self.hub.notify(self.context_id, key, None, old_value);
        }
        Ok(())
    }
}

impl Drop for ContextStore {
    fn drop(&mut self) {
        self.hub.detach(self.context_id);
    }
}
