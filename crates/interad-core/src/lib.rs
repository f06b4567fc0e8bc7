#![forbid(unsafe_code)]

//! Core: native ad-plugin bridge interfaces, payload types, errors, and events.
//!
//! This crate defines the seams between the session runtime
//! (`interad-runtime`) and the host it does not control:
//!
//! - [`AdPlugin`] — the capability surface a provider's native plugin exposes
//!   (callback-based init/load/show, optional destroy)
//! - [`PluginResolver`] — how a provider identifier is turned into a plugin
//! - [`BridgeResult`] / [`BridgeError`] — JSON-shaped payloads crossing the
//!   bridge in both directions
//! - [`AdError`] — the error taxonomy surfaced to callers and event listeners
//! - [`ListenerSet`] — ordered, append-only event listener storage

pub mod bridge;
pub mod error;
pub mod events;
pub mod logging;
pub mod options;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use bridge::{
    AdPlugin, BridgeError, BridgeResult, FailureCallback, InitCallback, PlacementParams,
    PluginHandle, PluginResolver, SuccessCallback,
};
pub use error::{
    AdError, AdErrorKind, CODE_INVALID_OPTIONS, CODE_UNKNOWN_EVENT, CODE_UNKNOWN_PROVIDER,
};
pub use events::{EVENT_CLOSE, EVENT_ERROR, EVENT_LOAD, EventListener, EventPayload, ListenerSet};
pub use options::AdOptions;
