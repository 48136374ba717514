#![forbid(unsafe_code)]

//! Reference culture notifier.
//!
//! [`LocaleContext`] owns the active locale as an [`Observable`] and a
//! [`TranslationCatalog`]. Pages subscribe to it through
//! [`ChangeNotifier`] and translate validation messages through
//! [`Translator`]. Scoped overrides let a subtree render in another locale
//! without notifying the whole page.

use std::cell::RefCell;
use std::env;
use std::rc::Rc;

pub use pagekit_i18n::Locale;
use pagekit_i18n::TranslationCatalog;

use crate::notifier::{ChangeNotifier, Translator};
use crate::reactive::{Observable, Subscription};

/// Locale state with scoped overrides and a translation catalog.
#[derive(Clone, Debug)]
pub struct LocaleContext {
    current: Observable<Locale>,
    overrides: Rc<RefCell<Vec<Locale>>>,
    catalog: Rc<TranslationCatalog>,
}

impl LocaleContext {
    /// Create a context for `locale` with an empty catalog.
    #[must_use]
    pub fn new(locale: impl Into<Locale>) -> Self {
        Self::with_catalog(locale, TranslationCatalog::new())
    }

    /// Create a context for `locale` translating through `catalog`.
    #[must_use]
    pub fn with_catalog(locale: impl Into<Locale>, catalog: TranslationCatalog) -> Self {
        Self {
            current: Observable::new(normalize_locale(&locale.into())),
            overrides: Rc::new(RefCell::new(Vec::new())),
            catalog: Rc::new(catalog),
        }
    }

    /// Create a context from the process environment (see
    /// [`detect_system_locale`]).
    #[must_use]
    pub fn system(catalog: TranslationCatalog) -> Self {
        Self::with_catalog(detect_system_locale(), catalog)
    }

    /// Active locale, honoring the innermost override.
    #[must_use]
    pub fn current_locale(&self) -> Locale {
        match self.overrides.borrow().last() {
            Some(locale) => locale.clone(),
            None => self.current.get(),
        }
    }

    /// Base locale, ignoring overrides.
    #[must_use]
    pub fn base_locale(&self) -> Locale {
        self.current.get()
    }

    /// Switch the base locale. Subscribers are notified only when the
    /// normalized tag differs from the current one.
    pub fn set_locale(&self, locale: impl Into<Locale>) {
        self.current.set(normalize_locale(&locale.into()));
    }

    /// Push a scoped override; dropping the guard restores the prior locale.
    #[must_use = "dropping this guard clears the locale override"]
    pub fn push_override(&self, locale: impl Into<Locale>) -> LocaleOverride {
        let locale = normalize_locale(&locale.into());
        self.overrides.borrow_mut().push(locale.clone());
        LocaleOverride {
            stack: Rc::clone(&self.overrides),
            locale,
        }
    }

    /// Number of base-locale changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.version()
    }

    #[must_use]
    pub fn catalog(&self) -> &TranslationCatalog {
        &self.catalog
    }
}

impl ChangeNotifier for LocaleContext {
    fn on_change(&self, handler: Box<dyn Fn()>) -> Subscription {
        self.current.subscribe(move |_| handler())
    }

    fn subscriber_count(&self) -> usize {
        self.current.subscriber_count()
    }
}

impl Translator for LocaleContext {
    fn translate(&self, text: &str) -> String {
        self.catalog
            .translate(&self.current_locale(), text)
            .into_owned()
    }
}

/// RAII guard for a scoped locale override.
#[must_use = "dropping this guard clears the locale override"]
pub struct LocaleOverride {
    stack: Rc<RefCell<Vec<Locale>>>,
    locale: Locale,
}

impl Drop for LocaleOverride {
    fn drop(&mut self) {
        let popped = self.stack.borrow_mut().pop();
        debug_assert_eq!(popped.as_ref(), Some(&self.locale));
    }
}

/// Detect the locale from `LC_ALL`, then `LANG`, defaulting to `"en"`.
#[must_use]
pub fn detect_system_locale() -> Locale {
    let lc_all = env::var("LC_ALL").ok();
    let lang = env::var("LANG").ok();
    detect_from(lc_all.as_deref(), lang.as_deref())
}

fn detect_from(lc_all: Option<&str>, lang: Option<&str>) -> Locale {
    lc_all
        .and_then(parse_tag)
        .or_else(|| lang.and_then(parse_tag))
        .unwrap_or_else(|| "en".to_string())
}

fn normalize_locale(raw: &str) -> Locale {
    parse_tag(raw).unwrap_or_else(|| "en".to_string())
}

/// `"pl_PL.UTF-8@euro"` → `"pl-PL"`; `C`/`POSIX` → `"en"`; blank → `None`.
fn parse_tag(raw: &str) -> Option<Locale> {
    let tag = raw
        .trim()
        .split(['@', '.'])
        .next()
        .unwrap_or_default()
        .trim();
    if tag.is_empty() {
        return None;
    }
    if tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
        return Some("en".to_string());
    }
    Some(tag.replace('_', "-"))
}
