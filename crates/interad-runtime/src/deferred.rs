#![forbid(unsafe_code)]

//! Single-shot deferred results for the cooperative single-threaded model.
//!
//! A [`Deferred`] is the caller-facing half of an operation whose outcome
//! arrives in a later callback turn; the [`Settler`] is the producer-facing
//! half. Settlement happens at most once: later resolve/reject attempts are
//! ignored, which mirrors how an already-settled promise absorbs duplicate
//! completions from overlapping native callbacks.
//!
//! Dropping a settler without settling leaves the deferred pending forever.
//! The session relies on exactly that to give superseded callers their
//! never-resolves behavior.

use std::cell::RefCell;
use std::rc::Rc;

use interad_core::AdError;

/// Outcome of a deferred operation.
pub type Outcome<T> = Result<T, AdError>;

struct Shared<T> {
    outcome: Option<Outcome<T>>,
    waiters: Vec<Box<dyn FnOnce(Outcome<T>)>>,
}

/// Caller-facing handle: observe or wait for the outcome.
pub struct Deferred<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

/// Producer-facing handle: settle the outcome exactly once.
///
/// Cloneable so a state machine can keep the settler in a pending slot and
/// still settle through a local copy; all copies share the settle-once
/// guarantee.
pub struct Settler<T> {
    shared: Rc<RefCell<Shared<T>>>,
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Clone for Settler<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: Clone + 'static> Deferred<T> {
    /// Create a pending deferred and its settler.
    #[must_use]
    pub fn new() -> (Self, Settler<T>) {
        let shared = Rc::new(RefCell::new(Shared {
            outcome: None,
            waiters: Vec::new(),
        }));
        (
            Self {
                shared: shared.clone(),
            },
            Settler { shared },
        )
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.borrow().outcome.is_none()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self.shared.borrow().outcome, Some(Ok(_)))
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self.shared.borrow().outcome, Some(Err(_)))
    }

    /// The rejection error, if rejected.
    #[must_use]
    pub fn error(&self) -> Option<AdError> {
        match &self.shared.borrow().outcome {
            Some(Err(err)) => Some(err.clone()),
            _ => None,
        }
    }

    /// The resolved value, if resolved.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match &self.shared.borrow().outcome {
            Some(Ok(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Run `f` with the outcome: immediately if already settled, otherwise
    /// at settlement time. Waiters run in registration order.
    pub fn on_settled(&self, f: impl FnOnce(Outcome<T>) + 'static) {
        let settled = self.shared.borrow().outcome.clone();
        match settled {
            Some(outcome) => f(outcome),
            None => self.shared.borrow_mut().waiters.push(Box::new(f)),
        }
    }
}

impl<T: Clone + 'static> Settler<T> {
    /// Resolve the deferred. Ignored if already settled.
    pub fn resolve(&self, value: T) {
        self.settle(Ok(value));
    }

    /// Reject the deferred. Ignored if already settled.
    pub fn reject(&self, err: AdError) {
        self.settle(Err(err));
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.shared.borrow().outcome.is_some()
    }

    fn settle(&self, outcome: Outcome<T>) {
        let waiters = {
            let mut shared = self.shared.borrow_mut();
            if shared.outcome.is_some() {
                return;
            }
            shared.outcome = Some(outcome.clone());
            std::mem::take(&mut shared.waiters)
        };
        // Borrow released: waiters may inspect the deferred or register more.
        for waiter in waiters {
            waiter(outcome.clone());
        }
    }
}
