#![forbid(unsafe_code)]

//! pagekit public facade.
//!
//! Re-exports the member crates and a prelude with the types most pages
//! need:
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use pagekit::prelude::*;
//!
//! #[derive(Default)]
//! struct Contact {
//!     email: String,
//! }
//!
//! let culture = LocaleContext::new("en");
//! let page = Page::new(
//!     LifecycleHost::builder(RenderHandle::noop())
//!         .services(Services::new().with_culture(Rc::new(culture.clone()))),
//!     PageConfig::default(),
//! );
//! let rules = Rules::new().required("Email", |c: &Contact| c.email.as_str());
//! let mut form = FormPage::new(page, Rc::new(rules));
//! form.initialize();
//!
//! assert!(!form.controller().is_valid());
//! form.set_parameters(Rc::new(RefCell::new(Contact { email: "a@b.c".into() })));
//! assert!(form.controller().is_valid());
//!
//! form.dispose();
//! ```

pub use pagekit_i18n as i18n;
pub use pagekit_runtime as runtime;

#[cfg(feature = "forms")]
pub use pagekit_forms as forms;

pub use pagekit_i18n::{I18nError, LocaleTable, TranslationCatalog};
pub use pagekit_runtime::{
    BoxError, Breadcrumb, BreadcrumbTrail, BreadcrumbsProvider, Capabilities, ChangeNotifier,
    CultureNotifier, DataLoader, Event, LifecycleConfig, LifecycleHost, LocaleContext, NotifierKind,
    Observable, Page, PageConfig, RefreshError, RefreshOutcome, RenderHandle, Services,
    Subscription, SubscriptionError, SubscriptionScope, Translator,
};

#[cfg(feature = "forms")]
pub use pagekit_forms::{
    FieldIdentifier, FormError, FormHandler, FormPage, FormSubmissionController, ModelValidator,
    Rules, SubmissionState, SubmitOutcome, ValidationEngine, ValidationFailure, ValidationMessage,
};

/// Common imports for building pages.
pub mod prelude {
    pub use pagekit_runtime::{
        Breadcrumb, BreadcrumbsProvider, ChangeNotifier, DataLoader, LifecycleHost, LocaleContext,
        Observable, Page, PageConfig, RenderHandle, Services, Translator,
    };

    #[cfg(feature = "forms")]
    pub use pagekit_forms::{
        FormHandler, FormPage, ModelValidator, Rules, SubmitOutcome, ValidationEngine,
    };
}
