#![forbid(unsafe_code)]

//! Change-notification primitives for pagekit.
//!
//! - [`Event`]: a multi-subscriber event; every notifier is built on it.
//! - [`Subscription`]: RAII guard that detaches its handler on release or
//!   drop, exactly once.
//! - [`Observable`]: a shared, version-tracked value that broadcasts changes.
//! - [`SubscriptionScope`]: a bag of guards released together at teardown.
//!
//! # Architecture
//!
//! Everything is single-threaded (`Rc<RefCell<..>>`), matching the UI
//! thread a page lives on. Events hold their handlers strongly; guards hold
//! the event weakly, so neither side keeps the other alive.
//!
//! # Invariants
//!
//! 1. Handlers run in registration order.
//! 2. A detached handler never runs again, including later in the emission
//!    cycle that detached it.
//! 3. An observable's version increments exactly once per value change.

pub mod event;
pub mod observable;
pub mod scope;

pub use event::{Event, Subscription};
pub use observable::Observable;
pub use scope::SubscriptionScope;
