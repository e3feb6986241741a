//! # Store Layer
//!
//! The persistent key-value store shared by all contexts, behind one trait.
//!
//! - [`Store`]: the external store interface (get / set / remove)
//! - [`MemoryStore`]: volatile in-process backend with an optional quota
//! - [`LogStore`]: durable append-only backend with checksummed records
//! - [`StoreHub`]: shared store plus native cross-context change signals

mod checksum;
mod errors;
mod hub;
mod log;
mod memory;
mod record;

pub use checksum::{compute_checksum, verify_checksum};
pub use errors::{StoreError, StoreResult};
pub use hub::{ContextStore, HubConfig, StoreHub};
pub use log::LogStore;
pub use memory::MemoryStore;
pub use record::EntryRecord;

/// External persistent key-value store interface.
///
/// The store exclusively owns persisted values; the synchronization layer
/// only reads, writes and removes by key. Implementations are shared
/// between contexts, so all methods take `&self`. Removing a missing key
/// succeeds as a no-op.
pub trait Store: Send + Sync {
    /// Read the raw value for `key`, or `None` if absent.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Persist `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove `key` from the store. Missing keys are a no-op.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
