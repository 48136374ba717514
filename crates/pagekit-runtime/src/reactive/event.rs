#![forbid(unsafe_code)]

//! Multi-subscriber events with RAII subscription guards.
//!
//! [`Event<A>`] is the primitive under every notifier in pagekit: locale
//! changes, workspace/catalog changes, and the field-changed and
//! validation-requested events of a form's edit context.
//!
//! # Invariants
//!
//! 1. Handlers run in registration order.
//! 2. A handler released during an emission cycle does not run later in that
//!    same cycle.
//! 3. A [`Subscription`] detaches its handler at most once: either on the
//!    first [`Subscription::release`] or on drop, whichever comes first.
//! 4. Releasing after the event itself was dropped is reported as
//!    [`SubscriptionError::NotifierDropped`] and is otherwise a no-op.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::SubscriptionError;

type Handler<A> = Rc<dyn Fn(&A)>;

struct EventInner<A> {
    handlers: RefCell<Vec<(u64, Handler<A>)>>,
    next_id: Cell<u64>,
}

impl<A> EventInner<A> {
    fn is_registered(&self, id: u64) -> bool {
        self.handlers.borrow().iter().any(|(h, _)| *h == id)
    }

    fn remove(&self, id: u64) {
        self.handlers.borrow_mut().retain(|(h, _)| *h != id);
    }
}

/// A single-threaded event with any number of handlers.
///
/// Cloning an `Event` yields another handle to the same handler list.
pub struct Event<A: 'static> {
    inner: Rc<EventInner<A>>,
}

impl<A: 'static> Clone for Event<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A: 'static> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> std::fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<A: 'static> Event<A> {
    /// Create an event with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EventInner {
                handlers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Register `handler`. It stays attached until the returned guard is
    /// released or dropped.
    pub fn subscribe(&self, handler: impl Fn(&A) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .handlers
            .borrow_mut()
            .push((id, Rc::new(handler)));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || match weak.upgrade() {
            Some(inner) => {
                inner.remove(id);
                true
            }
            None => false,
        })
    }

    /// Invoke every attached handler with `args`.
    ///
    /// Handlers may subscribe, release, or emit again; the handler list is
    /// snapshotted before the first call.
    pub fn emit(&self, args: &A) {
        let snapshot: Vec<(u64, Handler<A>)> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in snapshot {
            if self.inner.is_registered(id) {
                handler(args);
            }
        }
    }

    /// Number of attached handlers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }
}

/// RAII guard for an attached handler.
///
/// Dropping the guard detaches the handler. [`release`](Self::release)
/// detaches eagerly and reports what happened, which teardown code uses to
/// log without failing.
#[must_use = "dropping a Subscription detaches its handler"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() -> bool>>,
}

impl Subscription {
    fn new(detach: impl FnOnce() -> bool + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Whether the handler is still attached (from this guard's view).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.detach.is_some()
    }

    /// Detach the handler now.
    ///
    /// Returns [`SubscriptionError::AlreadyReleased`] on the second and later
    /// calls, and [`SubscriptionError::NotifierDropped`] when the event was
    /// gone; in both cases nothing else happens.
    pub fn release(&mut self) -> Result<(), SubscriptionError> {
        let detach = self.detach.take().ok_or(SubscriptionError::AlreadyReleased)?;
        if detach() {
            Ok(())
        } else {
            Err(SubscriptionError::NotifierDropped)
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
