//! # Synchronization Layer
//!
//! The storage facade (sanctioned mutation entry point with paired
//! broadcast), per-key subscription bindings, and the execution-context
//! surface tying a shared store to an in-context event channel.
//!
//! ## Data flow
//!
//! A mutator call enters the facade; the store is mutated; the in-context
//! notification is broadcast on the context channel. Sibling contexts
//! receive only the store's native signal, classified at the context's
//! ingest boundary. Bindings in any context receive one of the two kinds,
//! filter by key, and update their cached value.

mod context;
mod errors;
mod facade;
mod subscription;

pub use context::Context;
pub use errors::{SyncError, SyncResult};
pub use facade::StorageFacade;
pub use subscription::SubscriptionBinding;
