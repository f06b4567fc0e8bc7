#![forbid(unsafe_code)]

//! Event-name domain and ordered listener storage.
//!
//! A session knows a fixed set of event names: the base set below plus any
//! provider-specific names declared at construction. Registration against an
//! undeclared name is rejected; there is no dynamic method synthesis.
//!
//! Listener sets are append-only. Listeners are never removed individually;
//! callers drop the session when they are done with it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::error::AdError;

/// Fired when ad data has been loaded, with the native result payload.
pub const EVENT_LOAD: &str = "load";
/// Fired on provider-resolution, initialization, load, or show failure.
pub const EVENT_ERROR: &str = "error";
/// Fired by the host when the user dismisses the ad.
pub const EVENT_CLOSE: &str = "close";

/// Event names every session declares regardless of provider.
pub const BASE_EVENTS: [&str; 3] = [EVENT_LOAD, EVENT_ERROR, EVENT_CLOSE];

/// Payload delivered to listeners; an absent payload dispatches as `{}`.
pub type EventPayload = Value;

/// A registered event callback.
///
/// Stored behind `Rc<RefCell<..>>` so dispatch can snapshot the listener
/// list and invoke callbacks without holding any borrow of the set itself,
/// which keeps reentrant registration from a listener safe.
pub type EventListener = Rc<RefCell<dyn FnMut(&EventPayload)>>;

/// Ordered, append-only listener storage keyed by event name.
///
/// Slots exist for every declared name from the start, so membership checks
/// are a plain map lookup.
pub struct ListenerSet {
    slots: HashMap<String, Vec<EventListener>>,
}

impl ListenerSet {
    /// Create a set with a slot per declared event name.
    ///
    /// Duplicate names collapse into one slot.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots = HashMap::new();
        for name in names {
            slots.entry(name.into()).or_insert_with(Vec::new);
        }
        Self { slots }
    }

    /// Whether `name` was declared for this set.
    #[must_use]
    pub fn knows(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Append a listener to a declared event's slot.
    ///
    /// # Errors
    /// Returns an unknown-event error if `name` was never declared.
    pub fn push(&mut self, name: &str, listener: EventListener) -> Result<(), AdError> {
        match self.slots.get_mut(name) {
            Some(slot) => {
                slot.push(listener);
                Ok(())
            }
            None => Err(AdError::unknown_event(name)),
        }
    }

    /// Snapshot a slot's listeners in registration order.
    ///
    /// Undeclared names yield an empty snapshot; dispatching to them is a
    /// no-op rather than an error.
    #[must_use]
    pub fn snapshot(&self, name: &str) -> Vec<EventListener> {
        self.slots.get(name).cloned().unwrap_or_default()
    }

    /// Number of listeners registered for `name`.
    #[must_use]
    pub fn len(&self, name: &str) -> usize {
        self.slots.get(name).map_or(0, Vec::len)
    }

    /// Whether any slot holds a listener.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(Vec::is_empty)
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, slot) in &self.slots {
            map.entry(name, &slot.len());
        }
        map.finish()
    }
}
