#![forbid(unsafe_code)]

//! Mock plugins and resolvers for tests.
//!
//! [`MockPlugin`] records every bridge call and parks the callbacks so a
//! test controls completion order and timing; completions pop in FIFO order.
//! [`MapResolver`] is a [`PluginResolver`] over an in-memory map.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::bridge::{
    AdPlugin, BridgeError, BridgeResult, FailureCallback, InitCallback, PlacementParams,
    PluginHandle, PluginResolver, SuccessCallback,
};

#[derive(Default)]
struct MockState {
    init_calls: usize,
    load_calls: usize,
    show_calls: usize,
    load_placements: Vec<String>,
    show_placements: Vec<String>,
    destroy_placements: Vec<String>,
    pending_init: VecDeque<InitCallback>,
    pending_load: VecDeque<(SuccessCallback, FailureCallback)>,
    pending_show: VecDeque<(SuccessCallback, FailureCallback)>,
}

/// A scripted native plugin.
///
/// Callbacks are parked until the test completes them explicitly, which
/// makes in-flight states observable. Completions reenter the code under
/// test, so the internal borrow is always released before a callback runs.
#[derive(Default)]
pub struct MockPlugin {
    state: RefCell<MockState>,
}

impl MockPlugin {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    #[must_use]
    pub fn init_calls(&self) -> usize {
        self.state.borrow().init_calls
    }

    #[must_use]
    pub fn load_calls(&self) -> usize {
        self.state.borrow().load_calls
    }

    #[must_use]
    pub fn show_calls(&self) -> usize {
        self.state.borrow().show_calls
    }

    #[must_use]
    pub fn load_placements(&self) -> Vec<String> {
        self.state.borrow().load_placements.clone()
    }

    #[must_use]
    pub fn show_placements(&self) -> Vec<String> {
        self.state.borrow().show_placements.clone()
    }

    #[must_use]
    pub fn destroy_placements(&self) -> Vec<String> {
        self.state.borrow().destroy_placements.clone()
    }

    /// Complete the oldest pending init call. Returns false if none pending.
    pub fn complete_init(&self, result: BridgeResult) -> bool {
        let cb = self.state.borrow_mut().pending_init.pop_front();
        match cb {
            Some(cb) => {
                cb(result);
                true
            }
            None => false,
        }
    }

    /// Complete the oldest pending load call successfully.
    pub fn complete_load_ok(&self, result: BridgeResult) -> bool {
        let cbs = self.state.borrow_mut().pending_load.pop_front();
        match cbs {
            Some((on_success, _)) => {
                on_success(result);
                true
            }
            None => false,
        }
    }

    /// Fail the oldest pending load call.
    pub fn complete_load_err(&self, err: BridgeError) -> bool {
        let cbs = self.state.borrow_mut().pending_load.pop_front();
        match cbs {
            Some((_, on_failure)) => {
                on_failure(err);
                true
            }
            None => false,
        }
    }

    /// Complete the oldest pending show call successfully.
    pub fn complete_show_ok(&self, result: BridgeResult) -> bool {
        let cbs = self.state.borrow_mut().pending_show.pop_front();
        match cbs {
            Some((on_success, _)) => {
                on_success(result);
                true
            }
            None => false,
        }
    }

    /// Fail the oldest pending show call.
    pub fn complete_show_err(&self, err: BridgeError) -> bool {
        let cbs = self.state.borrow_mut().pending_show.pop_front();
        match cbs {
            Some((_, on_failure)) => {
                on_failure(err);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn pending_init_count(&self) -> usize {
        self.state.borrow().pending_init.len()
    }

    #[must_use]
    pub fn pending_load_count(&self) -> usize {
        self.state.borrow().pending_load.len()
    }

    #[must_use]
    pub fn pending_show_count(&self) -> usize {
        self.state.borrow().pending_show.len()
    }
}

impl AdPlugin for MockPlugin {
    fn init_sdk(&self, done: InitCallback) {
        let mut state = self.state.borrow_mut();
        state.init_calls += 1;
        state.pending_init.push_back(done);
    }

    fn load_data(
        &self,
        params: PlacementParams,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) {
        let mut state = self.state.borrow_mut();
        state.load_calls += 1;
        state.load_placements.push(params.placement_id);
        state.pending_load.push_back((on_success, on_failure));
    }

    fn show(
        &self,
        params: PlacementParams,
        on_success: SuccessCallback,
        on_failure: FailureCallback,
    ) {
        let mut state = self.state.borrow_mut();
        state.show_calls += 1;
        state.show_placements.push(params.placement_id);
        state.pending_show.push_back((on_success, on_failure));
    }

    fn destroy(&self, params: PlacementParams) {
        self.state
            .borrow_mut()
            .destroy_placements
            .push(params.placement_id);
    }
}

/// A resolver backed by an in-memory provider map.
#[derive(Default)]
pub struct MapResolver {
    plugins: RefCell<HashMap<String, PluginHandle>>,
    resolved: RefCell<Vec<String>>,
}

impl MapResolver {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn insert(&self, provider: impl Into<String>, plugin: PluginHandle) {
        self.plugins.borrow_mut().insert(provider.into(), plugin);
    }

    /// Providers looked up so far, in call order.
    #[must_use]
    pub fn resolved(&self) -> Vec<String> {
        self.resolved.borrow().clone()
    }
}

impl PluginResolver for MapResolver {
    fn resolve(&self, provider: &str) -> Option<PluginHandle> {
        self.resolved.borrow_mut().push(provider.to_string());
        self.plugins.borrow().get(provider).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_parks_and_completes_in_fifo_order() {
        let plugin = MockPlugin::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in [1, 2] {
            let order = order.clone();
            plugin.init_sdk(Box::new(move |_| order.borrow_mut().push(tag)));
        }
        assert_eq!(plugin.init_calls(), 2);
        assert_eq!(plugin.pending_init_count(), 2);

        assert!(plugin.complete_init(BridgeResult::success()));
        assert!(plugin.complete_init(BridgeResult::success()));
        assert!(!plugin.complete_init(BridgeResult::success()));
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn mock_records_placements() {
        let plugin = MockPlugin::new();
        plugin.load_data(
            PlacementParams::new("slot-1"),
            Box::new(|_| {}),
            Box::new(|_| {}),
        );
        plugin.destroy(PlacementParams::new("slot-1"));
        assert_eq!(plugin.load_placements(), vec!["slot-1"]);
        assert_eq!(plugin.destroy_placements(), vec!["slot-1"]);
    }

    #[test]
    fn resolver_records_lookups() {
        let resolver = MapResolver::new();
        let plugin = MockPlugin::new();
        resolver.insert("csj", plugin);

        assert!(resolver.resolve("csj").is_some());
        assert!(resolver.resolve("gdt").is_none());
        assert_eq!(resolver.resolved(), vec!["csj", "gdt"]);
    }
}
