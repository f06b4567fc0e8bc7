#![forbid(unsafe_code)]

//! Interactive-ad session runtime.
//!
//! This crate coordinates asynchronous load/show lifecycles against native
//! ad plugins reached through the seams defined in `interad-core`:
//!
//! - [`ProviderRegistry`] — per-provider SDK initialization cache with
//!   request coalescing: one native init per provider at a time, FIFO
//!   exactly-once notification of every concurrent requester
//! - [`InteractiveAd`] — per-placement state machine serializing load/show
//!   against the cached handle, with deferred results and ordered event
//!   dispatch
//! - [`AdRuntime`] — owning facade (registry + task queue) the host embeds
//!
//! Everything runs on one logical thread; "concurrency" is interleaved
//! callback completion, and the suspension points are exactly the native
//! calls.

pub mod deferred;
pub mod registry;
pub mod runtime;
pub mod session;
pub mod tasks;

pub use deferred::{Deferred, Outcome, Settler};
pub use registry::{ProviderRegistry, ProviderStatus};
pub use runtime::{AdRuntime, RuntimeConfig};
pub use session::InteractiveAd;
pub use tasks::TaskQueue;
