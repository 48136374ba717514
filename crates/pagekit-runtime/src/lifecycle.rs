#![forbid(unsafe_code)]

//! Subscription lifecycle for a page.
//!
//! [`LifecycleHost`] keeps a page in sync with three externally owned
//! notifiers (culture, workspace, catalog):
//!
//! - culture changes request a re-render;
//! - workspace and catalog changes schedule a *best-effort refresh*: the
//!   page's [`DataLoader`] runs again, then a re-render is requested.
//!
//! # Invariants
//!
//! 1. Each [`ChangeSubscription`] moves `Pending → Attached → Released` (or
//!    straight to `Released` when disposed before attaching) and never
//!    returns to `Attached`. Calling [`LifecycleHost::initialize`] again
//!    therefore never double-attaches, and initializing after dispose
//!    attaches nothing.
//! 2. [`LifecycleHost::dispose`] releases each subscription at most once and
//!    attempts all three even when one reports an error. It is idempotent
//!    and also runs on drop.
//! 3. After dispose, render requests are suppressed, including those from a
//!    refresh that was still in flight.
//!
//! # Best-effort refresh
//!
//! A refresh never propagates failure. Loader errors and scheduling errors
//! are logged at `warn` level, counted, and reported as
//! [`RefreshOutcome::Failed`]; the page keeps its last good render and its
//! subscriptions stay attached, so the next change triggers another attempt.
//! Errors from the *initial* load ([`LifecycleHost::initialize_async`]) are
//! business-logic failures and are returned to the caller instead.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::config::LifecycleConfig;
use crate::error::{BoxError, RefreshError, SubscriptionError};
use crate::notifier::{ChangeNotifier, NotifierKind, Services};
use crate::reactive::{Subscription, SubscriptionScope};
use crate::render::RenderHandle;

/// The page's asynchronous data-loading step.
///
/// Runs once on initialization and again on every refresh trigger.
pub trait DataLoader {
    fn load(&self) -> LocalBoxFuture<'_, Result<(), BoxError>>;
}

/// Loader for pages without data to fetch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoData;

impl DataLoader for NoData {
    fn load(&self) -> LocalBoxFuture<'_, Result<(), BoxError>> {
        Box::pin(async { Ok(()) })
    }
}

/// Result of one best-effort refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Data reloaded and a re-render was requested.
    Rendered,
    /// Reload failed; the error was logged and the last render kept.
    Failed(RefreshError),
    /// The host was disposed before the refresh could render.
    SuppressedAfterDispose,
}

impl RefreshOutcome {
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

/// Where a [`ChangeSubscription`] is in its one-way lifecycle.
#[derive(Debug)]
pub enum SubscriptionPhase {
    Pending,
    Attached(Subscription),
    Released,
}

/// One tracked notifier's subscription.
#[derive(Debug)]
pub struct ChangeSubscription {
    kind: NotifierKind,
    phase: SubscriptionPhase,
}

impl ChangeSubscription {
    #[must_use]
    pub fn new(kind: NotifierKind) -> Self {
        Self {
            kind,
            phase: SubscriptionPhase::Pending,
        }
    }

    #[must_use]
    pub fn kind(&self) -> NotifierKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> &SubscriptionPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        matches!(self.phase, SubscriptionPhase::Attached(_))
    }

    /// Attach `handler` to `notifier` if still pending. Returns whether it
    /// attached.
    pub fn attach(&mut self, notifier: &dyn ChangeNotifier, handler: Box<dyn Fn()>) -> bool {
        if !matches!(self.phase, SubscriptionPhase::Pending) {
            return false;
        }
        self.phase = SubscriptionPhase::Attached(notifier.on_change(handler));
        true
    }

    /// Move to `Released`, detaching if attached. Returns `Ok(true)` when a
    /// handler was detached by this call and `Ok(false)` when there was
    /// nothing to detach.
    pub fn release(&mut self) -> Result<bool, SubscriptionError> {
        match std::mem::replace(&mut self.phase, SubscriptionPhase::Released) {
            SubscriptionPhase::Attached(mut sub) => sub.release().map(|()| true),
            SubscriptionPhase::Pending | SubscriptionPhase::Released => Ok(false),
        }
    }
}

struct HostCore {
    render: RenderHandle,
    loader: Rc<dyn DataLoader>,
    spawner: Option<Rc<dyn LocalSpawn>>,
    disposed: Cell<bool>,
    refreshes: Cell<u64>,
    refresh_failures: Cell<u64>,
}

impl HostCore {
    fn record_failure(&self, err: RefreshError) -> RefreshOutcome {
        self.refresh_failures.set(self.refresh_failures.get() + 1);
        tracing::warn!(error = %err, "page refresh failed; keeping last render");
        RefreshOutcome::Failed(err)
    }

    async fn refresh(self: Rc<Self>) -> RefreshOutcome {
        if self.disposed.get() {
            return RefreshOutcome::SuppressedAfterDispose;
        }
        self.refreshes.set(self.refreshes.get() + 1);

        if let Err(source) = self.loader.load().await {
            return self.record_failure(RefreshError::Load(source));
        }
        if self.disposed.get() {
            tracing::debug!("refresh finished after dispose; render suppressed");
            return RefreshOutcome::SuppressedAfterDispose;
        }
        self.render.request();
        RefreshOutcome::Rendered
    }

    fn schedule_refresh(self: Rc<Self>, kind: NotifierKind) {
        tracing::debug!(notifier = %kind, "scheduling page refresh");
        let Some(spawner) = self.spawner.clone() else {
            self.record_failure(RefreshError::NoSpawner);
            return;
        };
        let core = Rc::clone(&self);
        if let Err(err) = spawner.spawn_local(async move {
            core.refresh().await;
        }) {
            self.record_failure(RefreshError::Spawn(err));
        }
    }
}

/// Builder for [`LifecycleHost`].
pub struct LifecycleHostBuilder {
    render: RenderHandle,
    config: LifecycleConfig,
    services: Services,
    loader: Rc<dyn DataLoader>,
    spawner: Option<Rc<dyn LocalSpawn>>,
}

impl LifecycleHostBuilder {
    #[must_use]
    pub fn config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    #[must_use]
    pub fn loader(mut self, loader: Rc<dyn DataLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Spawner used to run refreshes on the UI thread.
    #[must_use]
    pub fn spawner(mut self, spawner: Rc<dyn LocalSpawn>) -> Self {
        self.spawner = Some(spawner);
        self
    }

    #[must_use]
    pub fn build(self) -> LifecycleHost {
        LifecycleHost {
            config: self.config,
            services: self.services,
            core: Rc::new(HostCore {
                render: self.render,
                loader: self.loader,
                spawner: self.spawner,
                disposed: Cell::new(false),
                refreshes: Cell::new(0),
                refresh_failures: Cell::new(0),
            }),
            subscriptions: NotifierKind::ALL.map(ChangeSubscription::new),
            held: SubscriptionScope::new(),
            released: 0,
        }
    }
}

/// Lifecycle capability of a page.
pub struct LifecycleHost {
    config: LifecycleConfig,
    services: Services,
    core: Rc<HostCore>,
    subscriptions: [ChangeSubscription; 3],
    held: SubscriptionScope,
    released: usize,
}

impl LifecycleHost {
    /// Start building a host that re-renders through `render`.
    #[must_use]
    pub fn builder(render: RenderHandle) -> LifecycleHostBuilder {
        LifecycleHostBuilder {
            render,
            config: LifecycleConfig::default(),
            services: Services::default(),
            loader: Rc::new(NoData),
            spawner: None,
        }
    }

    /// Attach handlers to every present, enabled notifier that is not yet
    /// attached. Returns how many were attached by this call.
    pub fn initialize(&mut self) -> usize {
        let mut attached = 0;
        for sub in &mut self.subscriptions {
            let kind = sub.kind();
            if !self.config.tracks(kind) {
                continue;
            }
            let Some(notifier) = self.services.notifier(kind) else {
                tracing::debug!(notifier = %kind, "notifier not provided; skipping");
                continue;
            };
            let handler = change_handler(kind, Rc::downgrade(&self.core));
            if sub.attach(notifier, handler) {
                tracing::debug!(notifier = %kind, "attached change handler");
                attached += 1;
            }
        }
        attached
    }

    /// Run the initial data load. Errors are returned to the caller.
    pub async fn initialize_async(&self) -> Result<(), BoxError> {
        self.core.loader.load().await
    }

    /// Culture changed: re-render only.
    pub fn on_culture_change(&self) {
        self.core.render.request();
    }

    /// Workspace or catalog changed: reload, then re-render. Never fails.
    pub async fn on_refresh_change(&self) -> RefreshOutcome {
        Rc::clone(&self.core).refresh().await
    }

    /// Keep an extra subscription alive until dispose.
    pub fn hold(&mut self, sub: Subscription) {
        self.held.hold(sub);
    }

    /// Detach everything. Safe to call any number of times.
    pub fn dispose(&mut self) {
        if self.core.disposed.replace(true) {
            return;
        }
        self.core.render.suppress();

        for sub in &mut self.subscriptions {
            match sub.release() {
                Ok(true) => {
                    self.released += 1;
                    tracing::debug!(notifier = %sub.kind(), "detached change handler");
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::debug!(notifier = %sub.kind(), error = %err, "detach skipped");
                }
            }
        }
        for err in self.held.release_all() {
            tracing::debug!(error = %err, "held subscription release skipped");
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.disposed.get()
    }

    /// Whether the handler for `kind` is currently attached.
    #[must_use]
    pub fn is_attached(&self, kind: NotifierKind) -> bool {
        self.subscriptions.iter().any(|s| s.kind() == kind && s.is_attached())
    }

    #[must_use]
    pub fn subscription(&self, kind: NotifierKind) -> &ChangeSubscription {
        match kind {
            NotifierKind::Culture => &self.subscriptions[0],
            NotifierKind::Workspace => &self.subscriptions[1],
            NotifierKind::Catalog => &self.subscriptions[2],
        }
    }

    /// Handlers actually detached by dispose.
    #[must_use]
    pub fn released_count(&self) -> usize {
        self.released
    }

    /// Refreshes started (successful or not).
    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.core.refreshes.get()
    }

    /// Refreshes that failed and were logged.
    #[must_use]
    pub fn refresh_failures(&self) -> u64 {
        self.core.refresh_failures.get()
    }

    #[must_use]
    pub fn render_handle(&self) -> &RenderHandle {
        &self.core.render
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    #[must_use]
    pub fn config(&self) -> LifecycleConfig {
        self.config
    }
}

fn change_handler(kind: NotifierKind, core: Weak<HostCore>) -> Box<dyn Fn()> {
    Box::new(move || {
        let Some(core) = core.upgrade() else {
            return;
        };
        match kind {
            NotifierKind::Culture => {
                core.render.request();
            }
            NotifierKind::Workspace | NotifierKind::Catalog => core.schedule_refresh(kind),
        }
    })
}

impl Drop for LifecycleHost {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for LifecycleHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHost")
            .field("config", &self.config)
            .field("services", &self.services)
            .field("subscriptions", &self.subscriptions)
            .field("disposed", &self.core.disposed.get())
            .finish()
    }
}
