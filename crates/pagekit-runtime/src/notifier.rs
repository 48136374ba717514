#![forbid(unsafe_code)]

//! Interfaces to externally owned state.
//!
//! The runtime never fires these notifiers; concrete providers (culture,
//! workspace, catalog) own them and pages only subscribe.

use std::fmt;
use std::rc::Rc;

use crate::reactive::{Event, Observable, Subscription};

/// Something that announces "my state changed".
pub trait ChangeNotifier {
    /// Attach `handler`; it stays attached while the guard lives.
    fn on_change(&self, handler: Box<dyn Fn()>) -> Subscription;

    /// Number of attached handlers.
    fn subscriber_count(&self) -> usize;
}

/// Localizes display text.
pub trait Translator {
    fn translate(&self, text: &str) -> String;
}

/// The culture provider: a change notifier that can also translate.
pub trait CultureNotifier: ChangeNotifier + Translator {}

impl<T: ChangeNotifier + Translator + ?Sized> CultureNotifier for T {}

impl<T: Clone + PartialEq + 'static> ChangeNotifier for Observable<T> {
    fn on_change(&self, handler: Box<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| handler())
    }

    fn subscriber_count(&self) -> usize {
        Observable::subscriber_count(self)
    }
}

impl ChangeNotifier for Event<()> {
    fn on_change(&self, handler: Box<dyn Fn()>) -> Subscription {
        self.subscribe(move |()| handler())
    }

    fn subscriber_count(&self) -> usize {
        Event::subscriber_count(self)
    }
}

/// [`Translator`] view of a shared culture notifier.
#[derive(Clone)]
pub struct CultureTranslator(Rc<dyn CultureNotifier>);

impl CultureTranslator {
    /// Wrap `culture` as a shareable translator.
    #[must_use]
    pub fn shared(culture: Rc<dyn CultureNotifier>) -> Rc<dyn Translator> {
        Rc::new(Self(culture))
    }
}

impl Translator for CultureTranslator {
    fn translate(&self, text: &str) -> String {
        self.0.translate(text)
    }
}

/// Which external notifier a subscription tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifierKind {
    Culture,
    Workspace,
    Catalog,
}

impl NotifierKind {
    pub const ALL: [Self; 3] = [Self::Culture, Self::Workspace, Self::Catalog];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Culture => "culture",
            Self::Workspace => "workspace",
            Self::Catalog => "catalog",
        }
    }
}

impl fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The external notifiers a page may track. Any of them may be absent.
#[derive(Clone, Default)]
pub struct Services {
    culture: Option<Rc<dyn CultureNotifier>>,
    culture_changes: Option<Rc<dyn ChangeNotifier>>,
    workspace: Option<Rc<dyn ChangeNotifier>>,
    catalog: Option<Rc<dyn ChangeNotifier>>,
}

impl Services {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_culture<C: CultureNotifier + 'static>(mut self, culture: Rc<C>) -> Self {
        self.culture_changes = Some(Rc::clone(&culture) as Rc<dyn ChangeNotifier>);
        self.culture = Some(culture);
        self
    }

    #[must_use]
    pub fn with_workspace(mut self, workspace: Rc<dyn ChangeNotifier>) -> Self {
        self.workspace = Some(workspace);
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: Rc<dyn ChangeNotifier>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn culture(&self) -> Option<&Rc<dyn CultureNotifier>> {
        self.culture.as_ref()
    }

    /// Translator backed by the culture notifier, if one is present.
    #[must_use]
    pub fn translator(&self) -> Option<Rc<dyn Translator>> {
        self.culture.clone().map(CultureTranslator::shared)
    }

    /// The notifier for `kind` as a plain change notifier.
    #[must_use]
    pub fn notifier(&self, kind: NotifierKind) -> Option<&dyn ChangeNotifier> {
        match kind {
            NotifierKind::Culture => self.culture_changes.as_deref(),
            NotifierKind::Workspace => self.workspace.as_deref(),
            NotifierKind::Catalog => self.catalog.as_deref(),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("culture", &self.culture.is_some())
            .field("workspace", &self.workspace.is_some())
            .field("catalog", &self.catalog.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Upper;

    impl ChangeNotifier for Upper {
        fn on_change(&self, _handler: Box<dyn Fn()>) -> Subscription {
            Event::<()>::new().subscribe(|()| {})
        }

        fn subscriber_count(&self) -> usize {
            0
        }
    }

    impl Translator for Upper {
        fn translate(&self, text: &str) -> String {
            text.to_uppercase()
        }
    }

    #[test]
    fn observable_is_a_change_notifier() {
        let workspace = Observable::new(String::from("alpha"));
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let sub = workspace.on_change(Box::new(move || h.set(h.get() + 1)));
        assert_eq!(ChangeNotifier::subscriber_count(&workspace), 1);

        workspace.set("beta".into());
        assert_eq!(hits.get(), 1);
        drop(sub);
        assert_eq!(ChangeNotifier::subscriber_count(&workspace), 0);
    }

    #[test]
    fn unit_event_is_a_change_notifier() {
        let catalog = Event::<()>::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = catalog.on_change(Box::new(move || h.set(h.get() + 1)));
        catalog.emit(&());
        catalog.emit(&());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn services_expose_translator_from_culture() {
        let services = Services::new().with_culture(Rc::new(Upper));
        let translator = services.translator().expect("culture present");
        assert_eq!(translator.translate("required"), "REQUIRED");
        assert!(services.notifier(NotifierKind::Culture).is_some());
        assert!(services.notifier(NotifierKind::Workspace).is_none());
    }

    #[test]
    fn notifier_kind_names() {
        let names: Vec<_> = NotifierKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["culture", "workspace", "catalog"]);
    }
}
