//! Lifecycle invariants exercised through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use pagekit_runtime::{
    BoxError, ChangeNotifier, DataLoader, Event, LifecycleHost, LocaleContext, NotifierKind,
    Observable, RenderHandle, Services, Subscription,
};
use proptest::prelude::*;
use tracing::Level;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

struct Notifiers {
    culture: LocaleContext,
    workspace: Observable<String>,
    catalog: Event<()>,
}

impl Notifiers {
    fn new() -> Self {
        Self {
            culture: LocaleContext::new("en"),
            workspace: Observable::new("main".to_string()),
            catalog: Event::new(),
        }
    }

    fn services(&self) -> Services {
        Services::new()
            .with_culture(Rc::new(self.culture.clone()))
            .with_workspace(Rc::new(self.workspace.clone()))
            .with_catalog(Rc::new(self.catalog.clone()))
    }

    fn counts(&self) -> [usize; 3] {
        [
            ChangeNotifier::subscriber_count(&self.culture),
            self.workspace.subscriber_count(),
            self.catalog.subscriber_count(),
        ]
    }
}

/// Fails every call while `failing` is set.
#[derive(Default)]
struct FlakyLoader {
    failing: Cell<bool>,
    calls: Cell<u32>,
}

impl DataLoader for FlakyLoader {
    fn load(&self) -> LocalBoxFuture<'_, Result<(), BoxError>> {
        self.calls.set(self.calls.get() + 1);
        let failing = self.failing.get();
        Box::pin(async move {
            if failing {
                Err(BoxError::from("catalog service unavailable"))
            } else {
                Ok(())
            }
        })
    }
}

#[derive(Clone, Default)]
struct WarnCounter {
    messages: Arc<Mutex<Vec<String>>>,
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0.push_str(&format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            let mut message = String::new();
            event.record(&mut MessageVisitor(&mut message));
            self.messages.lock().unwrap().push(message);
        }
    }
}

#[test]
fn repeated_initialize_never_double_attaches() {
    let notifiers = Notifiers::new();
    let mut host = LifecycleHost::builder(RenderHandle::noop())
        .services(notifiers.services())
        .build();

    assert_eq!(host.initialize(), 3);
    for _ in 0..5 {
        assert_eq!(host.initialize(), 0);
    }
    assert_eq!(notifiers.counts(), [1, 1, 1]);
}

#[test]
fn missing_notifiers_are_skipped() {
    let catalog = Event::<()>::new();
    let mut host = LifecycleHost::builder(RenderHandle::noop())
        .services(Services::new().with_catalog(Rc::new(catalog.clone())))
        .build();
    assert_eq!(host.initialize(), 1);
    assert!(host.is_attached(NotifierKind::Catalog));
    assert!(!host.is_attached(NotifierKind::Culture));
    host.dispose();
    assert_eq!(host.released_count(), 1);
}

#[test]
fn shared_notifier_subscriptions_are_independent() {
    let notifiers = Notifiers::new();
    let mut first = LifecycleHost::builder(RenderHandle::noop())
        .services(notifiers.services())
        .build();
    let mut second = LifecycleHost::builder(RenderHandle::noop())
        .services(notifiers.services())
        .build();
    first.initialize();
    second.initialize();
    assert_eq!(notifiers.counts(), [2, 2, 2]);

    first.dispose();
    assert_eq!(notifiers.counts(), [1, 1, 1]);

    notifiers.culture.set_locale("pl");
    assert_eq!(first.render_handle().request_count(), 0);
    assert_eq!(second.render_handle().request_count(), 1);
}

/// A notifier that forgets its handlers as soon as it hands out the guard.
struct Orphaning;

impl ChangeNotifier for Orphaning {
    fn on_change(&self, handler: Box<dyn Fn()>) -> Subscription {
        Event::<()>::new().subscribe(move |()| handler())
    }

    fn subscriber_count(&self) -> usize {
        0
    }
}

#[test]
fn orphaned_subscription_is_skipped_on_dispose() {
    let catalog = Event::<()>::new();
    let mut host = LifecycleHost::builder(RenderHandle::noop())
        .services(
            Services::new()
                .with_workspace(Rc::new(Orphaning))
                .with_catalog(Rc::new(catalog.clone())),
        )
        .build();
    assert_eq!(host.initialize(), 2);

    host.dispose();
    assert!(host.is_disposed());
    assert_eq!(host.released_count(), 1);
    assert_eq!(catalog.subscriber_count(), 0);
}

#[test]
fn refresh_failure_is_logged_and_host_stays_usable() {
    let notifiers = Notifiers::new();
    let loader = Rc::new(FlakyLoader::default());
    let mut pool = LocalPool::new();
    let warnings = WarnCounter::default();
    let subscriber = Registry::default().with(warnings.clone());

    let mut host = LifecycleHost::builder(RenderHandle::noop())
        .services(notifiers.services())
        .loader(Rc::clone(&loader) as Rc<dyn DataLoader>)
        .spawner(Rc::new(pool.spawner()))
        .build();
    host.initialize();

    tracing::subscriber::with_default(subscriber, || {
        loader.failing.set(true);
        notifiers.catalog.emit(&());
        pool.run_until_stalled();
    });

    let messages = warnings.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("page refresh failed"));
    assert_eq!(host.refresh_failures(), 1);
    assert_eq!(host.render_handle().request_count(), 0);
    assert_eq!(notifiers.counts(), [1, 1, 1]);

    loader.failing.set(false);
    notifiers.workspace.set("archive".into());
    pool.run_until_stalled();
    assert_eq!(loader.calls.get(), 2);
    assert_eq!(host.render_handle().request_count(), 1);

    notifiers.culture.set_locale("de");
    assert_eq!(host.render_handle().request_count(), 2);
    assert_eq!(loader.calls.get(), 2);
}

#[test]
fn render_callback_receives_requests_until_dispose() {
    let rendered = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&rendered);
    let notifiers = Notifiers::new();
    let mut host = LifecycleHost::builder(RenderHandle::new(move || log.borrow_mut().push("render")))
        .services(notifiers.services())
        .build();
    host.initialize();

    notifiers.culture.set_locale("fr");
    host.dispose();
    notifiers.culture.set_locale("es");
    host.on_culture_change();
    assert_eq!(rendered.borrow().len(), 1);
}

proptest! {
    #[test]
    fn dispose_is_idempotent(disposes in 1usize..8, inits in 0usize..4) {
        let notifiers = Notifiers::new();
        let mut host = LifecycleHost::builder(RenderHandle::noop())
            .services(notifiers.services())
            .build();
        for _ in 0..=inits {
            host.initialize();
        }
        for _ in 0..disposes {
            host.dispose();
        }
        prop_assert_eq!(host.released_count(), 3);
        prop_assert_eq!(notifiers.counts(), [0, 0, 0]);
        prop_assert_eq!(host.initialize(), 0);
        drop(host);
        prop_assert_eq!(notifiers.counts(), [0, 0, 0]);
    }
}
