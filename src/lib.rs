//! keysync - cross-context key-value state synchronization
//!
//! Synchronizes application state with a shared persistent key-value store
//! across multiple independent consumers in one execution context and across
//! sibling contexts sharing the same store. A mutation through the storage
//! facade is persisted first, then broadcast on the writer's in-context event
//! channel; sibling contexts observe the store's native change signal instead.
//! Subscription bindings listen for both notification kinds, filter by key,
//! and converge on the written value.

pub mod channel;
pub mod codec;
pub mod observability;
pub mod store;
pub mod sync;
