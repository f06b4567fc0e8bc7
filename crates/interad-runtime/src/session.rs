#![forbid(unsafe_code)]

//! Per-ad-unit session state machine.
//!
//! An [`InteractiveAd`] wraps one placement of one provider and serializes
//! load/show traffic against the single underlying native handle. The
//! lifecycle is callback-driven: every native call parks the session in an
//! in-flight state that blocks a duplicate call of the same kind, and the
//! completion callback advances the machine and settles whichever caller is
//! currently pending.
//!
//! Pending callers use overwrite semantics: at most one load caller and one
//! show caller exist at a time, and a newer `load()`/`show()` replaces the
//! older one. The superseded caller's deferred stays pending forever. A
//! failed native load rejects only the pending show caller; the pending
//! load caller likewise stays pending until the next `load()`/`show()`.
//! Both behaviors are inherited from the host API this session fronts and
//! are pinned by tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Map, Value};

use interad_core::events::BASE_EVENTS;
use interad_core::{
    AdError, AdOptions, BridgeError, BridgeResult, EVENT_ERROR, EVENT_LOAD, EventPayload,
    ListenerSet, PlacementParams, PluginHandle,
};

use crate::deferred::{Deferred, Settler};
use crate::registry::ProviderRegistry;
use crate::tasks::TaskQueue;

struct SessionInner {
    provider: String,
    placement_id: String,
    registry: ProviderRegistry,
    handle: Option<PluginHandle>,
    last_error: Option<AdError>,
    loaded: bool,
    loading: bool,
    pending_load: Option<Settler<()>>,
    pending_show: Option<Settler<()>>,
    listeners: ListenerSet,
}

/// One managed ad unit coordinating load/show against a provider handle.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct InteractiveAd {
    inner: Rc<RefCell<SessionInner>>,
}

/// What `load()`/`show()` decided to do after recording the caller.
enum Step {
    Nothing,
    Init,
    ResolveNow(Settler<()>),
    ShowNow(Settler<()>),
    LoadAd,
}

impl InteractiveAd {
    /// Build a session and schedule its provider acquisition.
    ///
    /// Acquisition runs on the task queue, never inline, so listeners
    /// registered right after this call are in place before any event can
    /// fire.
    pub(crate) fn create(
        registry: ProviderRegistry,
        tasks: &TaskQueue,
        options: AdOptions,
    ) -> Result<Self, AdError> {
        options.validate()?;

        let listeners = ListenerSet::new(
            BASE_EVENTS
                .iter()
                .map(|s| s.to_string())
                .chain(options.custom_events),
        );
        let session = Self {
            inner: Rc::new(RefCell::new(SessionInner {
                provider: options.provider,
                placement_id: options.placement_id,
                registry,
                handle: None,
                last_error: None,
                loaded: false,
                loading: false,
                pending_load: None,
                pending_show: None,
                listeners,
            })),
        };

        let scheduled = session.clone();
        tasks.schedule(move || scheduled.init());
        Ok(session)
    }

    /// Provider identifier this session is bound to.
    #[must_use]
    pub fn provider(&self) -> String {
        self.inner.borrow().provider.clone()
    }

    /// Placement identifier this session manages.
    #[must_use]
    pub fn placement_id(&self) -> String {
        self.inner.borrow().placement_id.clone()
    }

    /// True between a successful load callback and the next show attempt.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().loaded
    }

    /// True while a native load call is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.borrow().loading
    }

    /// The last provider-resolution or initialization error, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<AdError> {
        self.inner.borrow().last_error.clone()
    }

    /// The bound native handle, once acquisition has succeeded.
    #[must_use]
    pub fn handle(&self) -> Option<PluginHandle> {
        self.inner.borrow().handle.clone()
    }

    /// Register a listener for a declared event name.
    ///
    /// Listeners are append-only and run synchronously in registration
    /// order when the event fires.
    ///
    /// # Errors
    /// Rejects names outside the base set plus the custom names declared at
    /// construction.
    pub fn on(
        &self,
        event: &str,
        callback: impl FnMut(&EventPayload) + 'static,
    ) -> Result<(), AdError> {
        self.inner
            .borrow_mut()
            .listeners
            .push(event, Rc::new(RefCell::new(callback)))
    }

    /// Register a listener for the `load` event.
    pub fn on_load(&self, callback: impl FnMut(&EventPayload) + 'static) {
        // Base events are always declared; registration cannot fail.
        let _ = self.on(EVENT_LOAD, callback);
    }

    /// Register a listener for the `error` event.
    pub fn on_error(&self, callback: impl FnMut(&EventPayload) + 'static) {
        let _ = self.on(EVENT_ERROR, callback);
    }

    /// Register a listener for the `close` event.
    pub fn on_close(&self, callback: impl FnMut(&EventPayload) + 'static) {
        let _ = self.on(interad_core::EVENT_CLOSE, callback);
    }

    /// Dispatch an event to its listeners.
    ///
    /// Exposed so the owning component can forward host events (`close`,
    /// provider-specific names) through the session's listener sets.
    ///
    /// # Errors
    /// Rejects undeclared event names.
    pub fn emit(&self, event: &str, payload: EventPayload) -> Result<(), AdError> {
        if !self.inner.borrow().listeners.knows(event) {
            return Err(AdError::unknown_event(event));
        }
        self.dispatch(event, payload);
        Ok(())
    }

    /// Request ad data.
    ///
    /// The returned deferred resolves when a native load completes, rejects
    /// never (a failed load emits `error` and leaves this caller pending —
    /// see the module docs), and resolves immediately when data is already
    /// loaded. Only the most recent load caller observes the outcome.
    pub fn load(&self) -> Deferred<()> {
        let (deferred, settler) = Deferred::new();
        let step = {
            let mut inner = self.inner.borrow_mut();
            inner.pending_load = Some(settler.clone());
            if inner.loading {
                Step::Nothing
            } else if inner.last_error.is_some() {
                Step::Init
            } else if inner.loaded {
                Step::ResolveNow(settler)
            } else {
                Step::LoadAd
            }
        };
        self.run_step(step);
        deferred
    }

    /// Show the ad, loading it first if necessary.
    ///
    /// When data is already loaded the native show is issued and the
    /// deferred resolves immediately; resolution never waits for the native
    /// show's own completion. Otherwise the deferred settles when the
    /// chained load settles it. Only the most recent show caller observes
    /// the outcome.
    pub fn show(&self) -> Deferred<()> {
        let (deferred, settler) = Deferred::new();
        let step = {
            let mut inner = self.inner.borrow_mut();
            inner.pending_show = Some(settler.clone());
            if inner.loading {
                Step::Nothing
            } else if inner.last_error.is_some() {
                Step::Init
            } else if inner.loaded {
                Step::ShowNow(settler)
            } else {
                Step::LoadAd
            }
        };
        self.run_step(step);
        deferred
    }

    /// Release the native placement if a handle is bound. No-op otherwise.
    ///
    /// Listener sets are not cleared; callers drop the session when done.
    pub fn destroy(&self) {
        let target = {
            let inner = self.inner.borrow();
            inner
                .handle
                .clone()
                .map(|handle| (handle, inner.placement_id.clone()))
        };
        if let Some((handle, placement_id)) = target {
            tracing::debug!(placement = %placement_id, "destroying native placement");
            handle.destroy(PlacementParams::new(placement_id));
        }
    }

    fn run_step(&self, step: Step) {
        match step {
            Step::Nothing => {}
            Step::Init => self.init(),
            Step::ResolveNow(settler) => settler.resolve(()),
            Step::ShowNow(settler) => {
                // Issue the native show first: a synchronous failure must be
                // able to reject before this caller resolves.
                self.show_ad();
                settler.resolve(());
            }
            Step::LoadAd => self.load_ad(),
        }
    }

    /// Acquire the provider handle, then start a preload.
    fn init(&self) {
        let (registry, provider) = {
            let mut inner = self.inner.borrow_mut();
            inner.last_error = None;
            (inner.registry.clone(), inner.provider.clone())
        };
        tracing::debug!(provider = %provider, "acquiring provider sdk");

        let on_success = {
            let session = self.clone();
            move |handle: PluginHandle| {
                session.inner.borrow_mut().handle = Some(handle);
                session.load_ad();
            }
        };
        let on_failure = {
            let session = self.clone();
            move |err: AdError| {
                let payload = err.to_payload();
                session.inner.borrow_mut().last_error = Some(err);
                session.dispatch(EVENT_ERROR, payload);
            }
        };
        registry.acquire(&provider, on_success, on_failure);
    }

    /// Issue a native load unless one is in flight or no handle is bound.
    fn load_ad(&self) {
        let issue = {
            let mut inner = self.inner.borrow_mut();
            match (inner.handle.clone(), inner.loading) {
                (Some(handle), false) => {
                    inner.loading = true;
                    Some((handle, inner.placement_id.clone()))
                }
                _ => None,
            }
        };
        let Some((handle, placement_id)) = issue else {
            return;
        };
        tracing::debug!(placement = %placement_id, "loading ad data");

        let on_success = {
            let session = self.clone();
            Box::new(move |result: BridgeResult| session.on_load_success(result))
        };
        let on_failure = {
            let session = self.clone();
            Box::new(move |err: BridgeError| session.on_load_failure(err))
        };
        handle.load_data(PlacementParams::new(placement_id), on_success, on_failure);
    }

    fn on_load_success(&self, result: BridgeResult) {
        let (load_settler, show_settler) = {
            let mut inner = self.inner.borrow_mut();
            inner.loaded = true;
            inner.loading = false;
            (inner.pending_load.take(), inner.pending_show.take())
        };
        tracing::debug!(
            had_load_caller = load_settler.is_some(),
            had_show_caller = show_settler.is_some(),
            "ad data loaded"
        );

        if let Some(settler) = load_settler {
            settler.resolve(());
        }
        if let Some(settler) = show_settler {
            settler.resolve(());
            // A waiting show caller is satisfied by this load: chain
            // straight into the native show.
            self.show_ad();
        }
        self.dispatch(EVENT_LOAD, result.data);
    }

    fn on_load_failure(&self, err: BridgeError) {
        let show_settler = {
            let mut inner = self.inner.borrow_mut();
            inner.loading = false;
            inner.pending_show.take()
        };
        tracing::debug!(code = err.code, "ad load failed");

        if let Some(settler) = show_settler {
            settler.reject(AdError::from(err.clone()));
        }
        // The pending load caller intentionally stays pending; see the
        // module docs.
        self.dispatch(EVENT_ERROR, err.to_payload());
    }

    /// Issue a native show if a handle is bound and data is loaded.
    fn show_ad(&self) {
        let issue = {
            let inner = self.inner.borrow();
            match (&inner.handle, inner.loaded) {
                (Some(handle), true) => Some((handle.clone(), inner.placement_id.clone())),
                _ => None,
            }
        };
        let Some((handle, placement_id)) = issue else {
            return;
        };
        tracing::debug!(placement = %placement_id, "showing ad");

        let on_success = {
            let session = self.clone();
            Box::new(move |_result: BridgeResult| {
                session.inner.borrow_mut().loaded = false;
            })
        };
        let on_failure = {
            let session = self.clone();
            Box::new(move |err: BridgeError| session.on_show_failure(err))
        };
        handle.show(PlacementParams::new(placement_id), on_success, on_failure);
    }

    fn on_show_failure(&self, err: BridgeError) {
        let show_settler = {
            let mut inner = self.inner.borrow_mut();
            inner.loaded = false;
            inner.pending_show.take()
        };
        tracing::debug!(code = err.code, "ad show failed");

        if let Some(settler) = show_settler {
            settler.reject(AdError::from(err.clone()));
        }
        self.dispatch(EVENT_ERROR, err.to_payload());
    }

    /// Invoke listeners synchronously, in registration order.
    ///
    /// The listener list is snapshotted before invocation, so a listener
    /// may register further listeners or call back into the session. A null
    /// payload dispatches as `{}`.
    fn dispatch(&self, event: &str, payload: EventPayload) {
        let payload = if payload.is_null() {
            Value::Object(Map::new())
        } else {
            payload
        };
        let listeners = self.inner.borrow().listeners.snapshot(event);
        for listener in listeners {
            (listener.borrow_mut())(&payload);
        }
    }
}

impl std::fmt::Debug for InteractiveAd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("InteractiveAd")
            .field("provider", &inner.provider)
            .field("placement_id", &inner.placement_id)
            .field("bound", &inner.handle.is_some())
            .field("loaded", &inner.loaded)
            .field("loading", &inner.loading)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use interad_core::test_helpers::{MapResolver, MockPlugin};
    use interad_core::CODE_UNKNOWN_EVENT;

    struct Harness {
        resolver: Rc<MapResolver>,
        plugin: Rc<MockPlugin>,
        registry: ProviderRegistry,
        tasks: TaskQueue,
    }

    impl Harness {
        fn new() -> Self {
            let resolver = MapResolver::new();
            let plugin = MockPlugin::new();
            resolver.insert("csj", plugin.clone());
            Self {
                registry: ProviderRegistry::new(resolver.clone()),
                resolver,
                plugin,
                tasks: TaskQueue::new(),
            }
        }

        fn session(&self) -> InteractiveAd {
            InteractiveAd::create(
                self.registry.clone(),
                &self.tasks,
                AdOptions::new("csj", "slot-1"),
            )
            .expect("valid options")
        }

        /// Pump construction, complete init, complete the automatic preload.
        fn ready_session(&self) -> InteractiveAd {
            let session = self.session();
            self.tasks.run_until_idle();
            self.plugin.complete_init(BridgeResult::success());
            self.plugin.complete_load_ok(BridgeResult::success());
            session
        }
    }

    #[test]
    fn missing_identity_fields_are_construction_errors() {
        let h = Harness::new();
        let err = InteractiveAd::create(h.registry.clone(), &h.tasks, AdOptions::default())
            .expect_err("empty options");
        assert_eq!(err.message, "provider invalid");

        let err = InteractiveAd::create(
            h.registry.clone(),
            &h.tasks,
            AdOptions::new("csj", ""),
        )
        .expect_err("missing placement");
        assert_eq!(err.message, "placementId invalid");
    }

    #[test]
    fn acquisition_is_deferred_past_construction() {
        let h = Harness::new();
        let _session = h.session();
        assert_eq!(h.plugin.init_calls(), 0);
        assert_eq!(h.resolver.resolved().len(), 0);

        h.tasks.run_until_idle();
        assert_eq!(h.plugin.init_calls(), 1);
    }

    #[test]
    fn init_success_preloads_and_emits_load() {
        let h = Harness::new();
        let session = h.session();
        let loads = Rc::new(RefCell::new(Vec::new()));
        {
            let loads = loads.clone();
            session.on_load(move |payload| loads.borrow_mut().push(payload.clone()));
        }

        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());
        assert!(session.is_loading());

        h.plugin
            .complete_load_ok(BridgeResult::success().with_data(serde_json::json!({"n": 1})));
        assert!(session.is_loaded());
        assert!(!session.is_loading());
        assert_eq!(*loads.borrow(), vec![serde_json::json!({"n": 1})]);
    }

    #[test]
    fn listener_registered_after_construction_sees_resolution_failure() {
        let h = Harness::new();
        let session = InteractiveAd::create(
            h.registry.clone(),
            &h.tasks,
            AdOptions::new("unknown", "slot-1"),
        )
        .expect("valid options");

        let errors = Rc::new(RefCell::new(Vec::new()));
        {
            let errors = errors.clone();
            session.on_error(move |payload| errors.borrow_mut().push(payload.clone()));
        }

        h.tasks.run_until_idle();
        assert_eq!(
            *errors.borrow(),
            vec![serde_json::json!({"code": -1, "message": "provider [unknown] invalid"})]
        );
        assert_eq!(session.last_error().map(|e| e.code), Some(-1));
    }

    #[test]
    fn double_load_issues_one_native_call_and_latest_caller_wins() {
        let h = Harness::new();
        let session = h.session();
        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());
        // The automatic preload is in flight.
        assert_eq!(h.plugin.load_calls(), 1);

        let first = session.load();
        let second = session.load();
        assert_eq!(h.plugin.load_calls(), 1);

        h.plugin.complete_load_ok(BridgeResult::success());
        assert!(second.is_resolved());
        // The superseded caller is never settled.
        assert!(first.is_pending());
    }

    #[test]
    fn load_when_already_loaded_resolves_immediately() {
        let h = Harness::new();
        let session = h.ready_session();
        assert!(session.is_loaded());

        let deferred = session.load();
        assert!(deferred.is_resolved());
        assert_eq!(h.plugin.load_calls(), 1);
    }

    #[test]
    fn show_before_load_chains_into_show_without_second_call() {
        let h = Harness::new();
        let session = h.session();
        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());

        let shown = session.show();
        assert!(shown.is_pending());
        assert_eq!(h.plugin.load_calls(), 1);
        assert_eq!(h.plugin.show_calls(), 0);

        h.plugin.complete_load_ok(BridgeResult::success());
        assert!(shown.is_resolved());
        assert_eq!(h.plugin.show_calls(), 1);
        assert_eq!(h.plugin.show_placements(), vec!["slot-1"]);
    }

    #[test]
    fn show_when_loaded_issues_native_show_and_resolves() {
        let h = Harness::new();
        let session = h.ready_session();

        let shown = session.show();
        assert!(shown.is_resolved());
        assert_eq!(h.plugin.load_calls(), 1, "no redundant load");
        assert_eq!(h.plugin.show_calls(), 1);

        // loaded flips false once the native show completes.
        assert!(session.is_loaded());
        h.plugin.complete_show_ok(BridgeResult::success());
        assert!(!session.is_loaded());
    }

    #[test]
    fn load_failure_rejects_pending_show_and_strands_pending_load() {
        let h = Harness::new();
        let session = h.session();
        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());

        let loaded = session.load();
        let shown = session.show();
        let errors = Rc::new(RefCell::new(Vec::new()));
        {
            let errors = errors.clone();
            session.on_error(move |payload| errors.borrow_mut().push(payload.clone()));
        }

        h.plugin
            .complete_load_err(BridgeError::new(1005, "no fill"));

        let err = shown.error().expect("show rejected");
        assert_eq!(err.code, 1005);
        assert_eq!(err.message, "no fill");
        assert!(loaded.is_pending(), "load caller stays pending");
        assert_eq!(
            *errors.borrow(),
            vec![serde_json::json!({"code": 1005, "message": "no fill"})]
        );
        assert!(!session.is_loading());
    }

    #[test]
    fn load_failure_is_retried_with_a_plain_reload() {
        let h = Harness::new();
        let session = h.session();
        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());
        h.plugin.complete_load_err(BridgeError::new(1005, "no fill"));

        // Load failures do not poison the session; the next call re-loads
        // without re-acquiring the provider.
        let retried = session.load();
        assert_eq!(h.plugin.init_calls(), 1);
        assert_eq!(h.plugin.load_calls(), 2);
        h.plugin.complete_load_ok(BridgeResult::success());
        assert!(retried.is_resolved());
    }

    #[test]
    fn init_failure_poisons_until_next_call_reacquires() {
        let h = Harness::new();
        let session = h.session();
        h.tasks.run_until_idle();
        h.plugin
            .complete_init(BridgeResult::failure(-7, "sdk refused"));
        assert_eq!(session.last_error().map(|e| e.code), Some(-7));

        // The next load re-runs acquisition; the provider entry had failed,
        // so a fresh native init is issued.
        let loaded = session.load();
        assert_eq!(h.plugin.init_calls(), 2);
        assert!(session.last_error().is_none());

        h.plugin.complete_init(BridgeResult::success());
        h.plugin.complete_load_ok(BridgeResult::success());
        assert!(loaded.is_resolved());
    }

    #[test]
    fn show_failure_flips_loaded_and_emits_error() {
        let h = Harness::new();
        let session = h.ready_session();
        let errors = Rc::new(RefCell::new(Vec::new()));
        {
            let errors = errors.clone();
            session.on_error(move |payload| errors.borrow_mut().push(payload.clone()));
        }

        let shown = session.show();
        assert!(shown.is_resolved());
        h.plugin.complete_show_err(BridgeError::new(2001, "render"));

        assert!(!session.is_loaded());
        assert_eq!(
            *errors.borrow(),
            vec![serde_json::json!({"code": 2001, "message": "render"})]
        );
        // The show caller had already resolved; the late rejection is
        // absorbed by settle-once.
        assert!(shown.is_resolved());
    }

    #[test]
    fn destroy_with_bound_handle_releases_placement_once() {
        let h = Harness::new();
        let session = h.ready_session();
        session.destroy();
        assert_eq!(h.plugin.destroy_placements(), vec!["slot-1"]);
    }

    #[test]
    fn destroy_without_handle_is_a_no_op() {
        let h = Harness::new();
        let session = h.session();
        // Construction queued but never pumped: no handle bound.
        session.destroy();
        assert!(h.plugin.destroy_placements().is_empty());
    }

    #[test]
    fn two_sessions_share_one_init_and_the_same_handle() {
        let h = Harness::new();
        let first = h.session();
        let second = h.session();
        h.tasks.run_until_idle();
        assert_eq!(h.plugin.init_calls(), 1);

        h.plugin.complete_init(BridgeResult::success());
        let a = first.handle().expect("first bound");
        let b = second.handle().expect("second bound");
        assert!(Rc::ptr_eq(&a, &b));
        // Each session preloads independently against the shared handle.
        assert_eq!(h.plugin.load_calls(), 2);
    }

    #[test]
    fn unknown_event_name_is_rejected() {
        let h = Harness::new();
        let session = h.session();
        let err = session.on("adClicked", |_| {}).expect_err("undeclared");
        assert_eq!(err.code, CODE_UNKNOWN_EVENT);
    }

    #[test]
    fn declared_custom_events_are_registrable_and_emittable() {
        let h = Harness::new();
        let session = InteractiveAd::create(
            h.registry.clone(),
            &h.tasks,
            AdOptions::new("csj", "slot-1").with_custom_event("adClicked"),
        )
        .expect("valid options");

        let clicks = Rc::new(RefCell::new(0));
        {
            let clicks = clicks.clone();
            session
                .on("adClicked", move |_| *clicks.borrow_mut() += 1)
                .expect("declared");
        }
        session
            .emit("adClicked", Value::Null)
            .expect("declared event");
        assert_eq!(*clicks.borrow(), 1);

        let err = session.emit("reward", Value::Null).expect_err("undeclared");
        assert_eq!(err.code, CODE_UNKNOWN_EVENT);
    }

    #[test]
    fn null_payload_dispatches_as_empty_object() {
        let h = Harness::new();
        let session = h.session();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            session.on_close(move |payload| seen.borrow_mut().push(payload.clone()));
        }
        session.emit("close", Value::Null).expect("base event");
        assert_eq!(*seen.borrow(), vec![serde_json::json!({})]);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let h = Harness::new();
        let session = h.session();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in 1..=3 {
            let log = log.clone();
            session.on_error(move |_| log.borrow_mut().push(tag));
        }
        session
            .emit(EVENT_ERROR, serde_json::json!({"code": 1}))
            .expect("base event");
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn listener_may_reenter_the_session() {
        let h = Harness::new();
        let session = h.session();
        let reentered = Rc::new(RefCell::new(false));
        {
            let session2 = session.clone();
            let reentered = reentered.clone();
            session.on_load(move |_| {
                *reentered.borrow_mut() = true;
                // Already loaded: resolves without a native call.
                let _ = session2.load();
            });
        }

        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());
        h.plugin.complete_load_ok(BridgeResult::success());
        assert!(*reentered.borrow());
        assert_eq!(h.plugin.load_calls(), 1);
    }

    #[test]
    fn show_while_loading_waits_for_the_load() {
        let h = Harness::new();
        let session = h.session();
        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());
        assert!(session.is_loading());

        let shown = session.show();
        assert_eq!(h.plugin.load_calls(), 1, "no extra load issued");
        assert_eq!(h.plugin.show_calls(), 0);

        h.plugin.complete_load_ok(BridgeResult::success());
        assert!(shown.is_resolved());
        assert_eq!(h.plugin.show_calls(), 1);
    }

    #[test]
    fn newer_show_caller_supersedes_older() {
        let h = Harness::new();
        let session = h.session();
        h.tasks.run_until_idle();
        h.plugin.complete_init(BridgeResult::success());

        let first = session.show();
        let second = session.show();
        h.plugin.complete_load_ok(BridgeResult::success());

        assert!(second.is_resolved());
        assert!(first.is_pending(), "superseded show caller never settles");
        assert_eq!(h.plugin.show_calls(), 1);
    }
}
