#![forbid(unsafe_code)]

//! Owning facade tying the provider cache and task queue together.
//!
//! One [`AdRuntime`] per host view. Sessions created through it share its
//! provider registry (so SDK initialization coalesces across sessions) and
//! defer their acquisition onto its task queue, which the embedder pumps
//! from its loop.

use std::rc::Rc;

use interad_core::{AdError, AdOptions, PluginResolver};

use crate::registry::ProviderRegistry;
use crate::session::InteractiveAd;
use crate::tasks::TaskQueue;

/// Tunables for the runtime's task pumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on tasks run per [`AdRuntime::tick`].
    pub tasks_per_tick: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { tasks_per_tick: 32 }
    }
}

impl RuntimeConfig {
    #[must_use]
    pub fn with_tasks_per_tick(mut self, limit: usize) -> Self {
        self.tasks_per_tick = limit;
        self
    }
}

/// Factory and pump for interactive ad sessions.
#[derive(Debug)]
pub struct AdRuntime {
    registry: ProviderRegistry,
    tasks: TaskQueue,
    config: RuntimeConfig,
}

impl AdRuntime {
    #[must_use]
    pub fn new(resolver: Rc<dyn PluginResolver>) -> Self {
        Self::with_config(resolver, RuntimeConfig::default())
    }

    #[must_use]
    pub fn with_config(resolver: Rc<dyn PluginResolver>, config: RuntimeConfig) -> Self {
        Self {
            registry: ProviderRegistry::new(resolver),
            tasks: TaskQueue::new(),
            config,
        }
    }

    /// Create a session for one placement.
    ///
    /// # Errors
    /// Returns an invalid-options error when `provider` or `placement_id`
    /// is missing; construction never panics.
    pub fn create_interactive_ad(&self, options: AdOptions) -> Result<InteractiveAd, AdError> {
        InteractiveAd::create(self.registry.clone(), &self.tasks, options)
    }

    /// Run up to the configured number of queued tasks.
    pub fn tick(&self) -> usize {
        self.tasks.run_at_most(self.config.tasks_per_tick)
    }

    /// Drain the task queue completely.
    pub fn run_until_idle(&self) -> usize {
        self.tasks.run_until_idle()
    }

    /// The shared provider cache.
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// The shared task queue.
    #[must_use]
    pub fn tasks(&self) -> &TaskQueue {
        &self.tasks
    }
}
