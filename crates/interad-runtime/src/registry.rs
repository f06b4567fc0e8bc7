#![forbid(unsafe_code)]

//! Provider SDK cache with request coalescing.
//!
//! The registry guarantees that a provider's native SDK is initialized at
//! most once at a time: the first `acquire` for an uninitialized provider
//! issues the native `initSDK` call, every `acquire` arriving while that
//! call is in flight joins a FIFO queue, and the single completion drains
//! the queue exactly once — every waiter is notified exactly once, in
//! arrival order, with the same outcome.
//!
//! A provider that failed stays failed until somebody asks again: the next
//! `acquire` re-enters initialization. The registry never retries on its
//! own.
//!
//! This is an explicit owned object, not hidden module state; tests build
//! isolated registries per case. Clones share the same cache.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use interad_core::{AdError, BridgeResult, PluginHandle, PluginResolver};

/// Observable lifecycle of one provider entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    /// No acquisition has been attempted (or the entry was reset).
    Uninitialized,
    /// A native init call is in flight; new requests queue behind it.
    Initializing,
    /// The SDK is initialized and a handle is cached.
    Ready,
    /// The last initialization attempt failed; the next acquire retries.
    Failed,
}

enum ProviderState {
    Uninitialized,
    Initializing,
    Ready(PluginHandle),
    Failed,
}

struct Waiter {
    on_success: Box<dyn FnOnce(PluginHandle)>,
    on_failure: Box<dyn FnOnce(AdError)>,
}

#[derive(Default)]
struct Entry {
    state: ProviderState,
    queue: VecDeque<Waiter>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

struct RegistryInner {
    resolver: Rc<dyn PluginResolver>,
    entries: HashMap<String, Entry>,
}

/// Process-level cache of initialized provider SDKs.
#[derive(Clone)]
pub struct ProviderRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

enum AcquireAction {
    /// Entry was ready: notify the caller synchronously.
    Notify(PluginHandle, Waiter),
    /// Joined the in-flight initialization's queue.
    Wait,
    /// This call starts the initialization.
    Start,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new(resolver: Rc<dyn PluginResolver>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                resolver,
                entries: HashMap::new(),
            })),
        }
    }

    /// Request an initialized handle for `provider`.
    ///
    /// Exactly one of the continuations is invoked exactly once. If the
    /// provider is already ready, `on_success` runs synchronously within
    /// this call; otherwise it runs when the single in-flight native init
    /// completes. Continuations are invoked with no interior borrow held,
    /// so they may reenter the registry.
    pub fn acquire(
        &self,
        provider: &str,
        on_success: impl FnOnce(PluginHandle) + 'static,
        on_failure: impl FnOnce(AdError) + 'static,
    ) {
        let waiter = Waiter {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
        };
        let action = {
            let mut inner = self.inner.borrow_mut();
            let entry = inner.entries.entry(provider.to_string()).or_default();
            match &entry.state {
                ProviderState::Ready(handle) => AcquireAction::Notify(handle.clone(), waiter),
                ProviderState::Initializing => {
                    entry.queue.push_back(waiter);
                    AcquireAction::Wait
                }
                ProviderState::Uninitialized | ProviderState::Failed => {
                    entry.state = ProviderState::Initializing;
                    entry.queue.push_back(waiter);
                    AcquireAction::Start
                }
            }
        };
        match action {
            AcquireAction::Notify(handle, waiter) => {
                tracing::trace!(provider, "provider ready, notifying synchronously");
                (waiter.on_success)(handle);
            }
            AcquireAction::Wait => {
                tracing::trace!(provider, "provider initializing, queued");
            }
            AcquireAction::Start => self.start_init(provider),
        }
    }

    /// Observable state of a provider entry.
    #[must_use]
    pub fn status(&self, provider: &str) -> ProviderStatus {
        match self.inner.borrow().entries.get(provider).map(|e| &e.state) {
            None | Some(ProviderState::Uninitialized) => ProviderStatus::Uninitialized,
            Some(ProviderState::Initializing) => ProviderStatus::Initializing,
            Some(ProviderState::Ready(_)) => ProviderStatus::Ready,
            Some(ProviderState::Failed) => ProviderStatus::Failed,
        }
    }

    /// The cached handle, if the provider is ready.
    #[must_use]
    pub fn handle(&self, provider: &str) -> Option<PluginHandle> {
        match self.inner.borrow().entries.get(provider).map(|e| &e.state) {
            Some(ProviderState::Ready(handle)) => Some(handle.clone()),
            _ => None,
        }
    }

    /// Return a provider entry to `Uninitialized`.
    ///
    /// Refused (returns false) while an initialization is in flight, since
    /// the queued waiters still need the pending outcome.
    pub fn reset(&self, provider: &str) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.entries.get_mut(provider) {
            Some(entry) => match entry.state {
                ProviderState::Initializing => false,
                _ => {
                    entry.state = ProviderState::Uninitialized;
                    true
                }
            },
            None => true,
        }
    }

    fn start_init(&self, provider: &str) {
        let resolver = self.inner.borrow().resolver.clone();
        let Some(plugin) = resolver.resolve(provider) else {
            tracing::warn!(provider, "no native plugin for provider");
            self.finish(provider, Err(AdError::unknown_provider(provider)));
            return;
        };

        tracing::debug!(provider, "initializing provider sdk");
        let registry = self.clone();
        let provider = provider.to_string();
        let handle: PluginHandle = plugin.clone();
        plugin.init_sdk(Box::new(move |result: BridgeResult| {
            if result.is_success() {
                registry.finish(&provider, Ok(handle));
            } else {
                registry.finish(&provider, Err(AdError::init_failed(result.code, result.message)));
            }
        }));
    }

    /// Transition out of `Initializing` and drain the queue exactly once.
    fn finish(&self, provider: &str, outcome: Result<PluginHandle, AdError>) {
        let waiters = {
            let mut inner = self.inner.borrow_mut();
            let Some(entry) = inner.entries.get_mut(provider) else {
                return;
            };
            // Ignore duplicate or stale completions from a misbehaving host.
            if !matches!(entry.state, ProviderState::Initializing) {
                return;
            }
            entry.state = match &outcome {
                Ok(handle) => ProviderState::Ready(handle.clone()),
                Err(_) => ProviderState::Failed,
            };
            std::mem::take(&mut entry.queue)
        };

        tracing::debug!(
            provider,
            waiters = waiters.len(),
            success = outcome.is_ok(),
            "provider initialization settled"
        );
        for waiter in waiters {
            match &outcome {
                Ok(handle) => (waiter.on_success)(handle.clone()),
                Err(err) => (waiter.on_failure)(err.clone()),
            }
        }
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        let mut map = f.debug_map();
        for (provider, entry) in &inner.entries {
            let state = match entry.state {
                ProviderState::Uninitialized => "uninitialized",
                ProviderState::Initializing => "initializing",
                ProviderState::Ready(_) => "ready",
                ProviderState::Failed => "failed",
            };
            map.entry(provider, &state);
        }
        map.finish()
    }
}
