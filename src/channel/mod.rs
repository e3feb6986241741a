//! # Event Channel
//!
//! Carries "key K changed to V" from a writer to every interested listener
//! within the same execution context, and classifies untyped incoming
//! payloads as either this channel's notification format or the store's
//! native cross-context format.
//!
//! Both kinds are normalized into [`StorageEvent`] at the boundary where
//! they enter the system, so the rest of the crate dispatches on a variant
//! instead of re-inspecting shapes.

mod channel;
mod event;

pub use channel::{EventChannel, ListenerId};
pub use event::{
    is_change_notification, ChangeNotification, NativeChangeNotification, StorageEvent,
    CHANGE_SIGNAL, NATIVE_SIGNAL,
};
