#![forbid(unsafe_code)]

//! Page runtime for pagekit.
//!
//! This crate provides:
//! - [`reactive`]: events, observables and RAII subscription guards
//! - [`LifecycleHost`]: lazy subscription to culture/workspace/catalog
//!   notifiers with best-effort refresh and deterministic teardown
//! - [`LocaleContext`]: a reference culture notifier backed by a
//!   [`TranslationCatalog`](pagekit_i18n::TranslationCatalog)
//! - [`Page`]: lifecycle plus optional breadcrumbs
//!
//! All types are single-threaded and meant to live on the UI thread.

pub mod breadcrumbs;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod locale;
pub mod notifier;
pub mod page;
pub mod reactive;
pub mod render;

pub use breadcrumbs::{Breadcrumb, BreadcrumbTrail, BreadcrumbsProvider};
pub use config::{Capabilities, LifecycleConfig, PageConfig};
#[cfg(feature = "policy-config")]
pub use error::ConfigError;
pub use error::{BoxError, RefreshError, SubscriptionError};
pub use lifecycle::{
    ChangeSubscription, DataLoader, LifecycleHost, LifecycleHostBuilder, NoData, RefreshOutcome,
    SubscriptionPhase,
};
pub use locale::{Locale, LocaleContext, LocaleOverride, detect_system_locale};
pub use notifier::{
    ChangeNotifier, CultureNotifier, CultureTranslator, NotifierKind, Services, Translator,
};
pub use page::Page;
pub use reactive::{Event, Observable, Subscription, SubscriptionScope};
pub use render::RenderHandle;
