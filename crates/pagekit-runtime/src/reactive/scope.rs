#![forbid(unsafe_code)]

//! Subscription collections tied to a component's lifetime.

use super::event::Subscription;
use super::observable::Observable;
use crate::error::SubscriptionError;

/// Holds subscriptions for one logical owner (usually a page).
///
/// # Invariants
///
/// 1. [`release_all`](Self::release_all) attempts every held subscription,
///    even when an earlier one reports an error.
/// 2. Subscriptions are released in reverse registration order.
/// 3. Dropping the scope releases whatever is still held.
#[derive(Default)]
pub struct SubscriptionScope {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `sub` alive until the scope is released.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to `source` and hold the guard.
    pub fn subscribe<T: Clone + PartialEq + 'static>(
        &mut self,
        source: &Observable<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        self.hold(source.subscribe(callback));
        self
    }

    /// Number of held subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release every held subscription, collecting the errors instead of
    /// stopping at the first one. The scope is empty and reusable afterwards.
    pub fn release_all(&mut self) -> Vec<SubscriptionError> {
        let mut errors = Vec::new();
        while let Some(mut sub) = self.subscriptions.pop() {
            if let Err(err) = sub.release() {
                errors.push(err);
            }
        }
        errors
    }
}

impl std::fmt::Debug for SubscriptionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionScope")
            .field("held", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Event;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn release_all_detaches_everything() {
        let obs = Observable::new(0);
        let hits = Rc::new(Cell::new(0));
        let mut scope = SubscriptionScope::new();
        for _ in 0..3 {
            let h = Rc::clone(&hits);
            scope.subscribe(&obs, move |_| h.set(h.get() + 1));
        }
        assert_eq!(scope.len(), 3);
        obs.set(1);
        assert_eq!(hits.get(), 3);

        assert!(scope.release_all().is_empty());
        assert!(scope.is_empty());
        obs.set(2);
        assert_eq!(hits.get(), 3);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn one_failing_release_does_not_skip_others() {
        let survivor = Observable::new(0);
        let doomed = Event::<()>::new();
        let mut scope = SubscriptionScope::new();
        scope.subscribe(&survivor, |_| {});
        scope.hold(doomed.subscribe(|()| {}));
        scope.subscribe(&survivor, |_| {});
        drop(doomed);

        let errors = scope.release_all();
        assert_eq!(errors, vec![SubscriptionError::NotifierDropped]);
        assert_eq!(survivor.subscriber_count(), 0);
    }

    #[test]
    fn held_guard_released_early_is_reported() {
        let event = Event::<()>::new();
        let mut early = event.subscribe(|()| {});
        early.release().expect("attached");

        let mut scope = SubscriptionScope::new();
        scope.hold(early);
        scope.hold(event.subscribe(|()| {}));
        assert_eq!(event.subscriber_count(), 1);

        let errors = scope.release_all();
        assert_eq!(errors, vec![SubscriptionError::AlreadyReleased]);
        assert_eq!(event.subscriber_count(), 0);
    }

    #[test]
    fn drop_releases() {
        let obs = Observable::new(0);
        {
            let mut scope = SubscriptionScope::new();
            scope.subscribe(&obs, |_| {});
            assert_eq!(obs.subscriber_count(), 1);
        }
        assert_eq!(obs.subscriber_count(), 0);
    }
}
