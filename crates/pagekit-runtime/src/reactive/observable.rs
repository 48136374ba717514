#![forbid(unsafe_code)]

//! Shared, version-tracked values with change notification.
//!
//! # Invariants
//!
//! 1. The version increments exactly once per mutation that changes the value.
//! 2. Setting a value equal to the current one is a no-op (no version bump,
//!    no notification).
//! 3. Subscribers see the new value; they may read the observable again
//!    from inside the callback.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::event::{Event, Subscription};

struct ObservableInner<T: 'static> {
    value: RefCell<T>,
    version: Cell<u64>,
    changed: Event<T>,
}

/// A shared value whose changes are broadcast to subscribers.
///
/// Cloning an `Observable` creates another handle to the **same** value.
pub struct Observable<T: 'static> {
    inner: Rc<ObservableInner<T>>,
}

impl<T: 'static> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .field("subscribers", &self.inner.changed.subscriber_count())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Wrap `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                value: RefCell::new(value),
                version: Cell::new(0),
                changed: Event::new(),
            }),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value, notifying subscribers when it changed.
    pub fn set(&self, value: T) {
        if *self.inner.value.borrow() == value {
            return;
        }
        *self.inner.value.borrow_mut() = value;
        self.bump_and_notify();
    }

    /// Mutate the value in place, notifying subscribers when it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let before = self.get();
        {
            let mut value = self.inner.value.borrow_mut();
            f(&mut value);
            if *value == before {
                return;
            }
        }
        self.bump_and_notify();
    }

    /// Register a change callback.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.changed.subscribe(callback)
    }

    /// Number of mutations that changed the value.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Number of attached change callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.changed.subscriber_count()
    }

    fn bump_and_notify(&self) {
        self.inner.version.set(self.inner.version.get() + 1);
        let snapshot = self.get();
        self.inner.changed.emit(&snapshot);
    }
}
