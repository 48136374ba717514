#![forbid(unsafe_code)]

//! Form page: a [`Page`] with a validated, submittable model.

use std::cell::RefCell;
use std::rc::Rc;

use pagekit_runtime::Page;

use crate::engine::ValidationEngine;
use crate::error::FormError;
use crate::rules::ModelValidator;
use crate::submit::{FormHandler, FormSubmissionController, SubmitOutcome};

/// A page whose model is validated and submitted through a
/// [`FormSubmissionController`].
///
/// The controller shares the page's render handle, so renders requested by
/// validation or submission are suppressed once the page is disposed, and it
/// translates through the page's culture notifier when one is provided.
#[derive(Debug)]
pub struct FormPage<M: 'static> {
    page: Page,
    controller: FormSubmissionController<M>,
}

impl<M: 'static> FormPage<M> {
    #[must_use]
    pub fn new(page: Page, validator: Rc<dyn ModelValidator<M>>) -> Self {
        let mut engine = ValidationEngine::new(validator, page.host().render_handle().clone());
        if let Some(translator) = page.host().services().translator() {
            engine = engine.with_translator(translator);
        }
        Self {
            page,
            controller: FormSubmissionController::new(engine),
        }
    }

    /// Initialize the page and bind a default model if none is bound yet.
    pub fn initialize(&mut self) -> usize
    where
        M: Default,
    {
        let attached = self.page.initialize();
        let engine = self.controller.engine();
        if !engine.is_bound() && !self.page.host().is_disposed() {
            engine.reset_default();
        }
        attached
    }

    /// Bind `model`; a no-op when it is already the bound instance.
    pub fn set_parameters(&self, model: Rc<RefCell<M>>) -> bool {
        self.controller.engine().bind(model)
    }

    pub async fn submit(&self, handler: &dyn FormHandler<M>) -> Result<SubmitOutcome, FormError> {
        self.controller.submit(handler).await
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    #[must_use]
    pub fn controller(&self) -> &FormSubmissionController<M> {
        &self.controller
    }

    /// Detach the form binding, then the page's subscriptions.
    pub fn dispose(&mut self) {
        self.controller.dispose();
        self.page.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;
    use futures::executor::block_on;
    use pagekit_runtime::{LifecycleHost, LocaleContext, PageConfig, RenderHandle, Services};

    #[derive(Default)]
    struct Login {
        user: String,
    }

    fn form(services: Services) -> FormPage<Login> {
        let page = Page::new(
            LifecycleHost::builder(RenderHandle::noop()).services(services),
            PageConfig::default(),
        );
        let rules = Rules::new().required("User", |l: &Login| l.user.as_str());
        FormPage::new(page, Rc::new(rules))
    }

    #[test]
    fn initialize_binds_default_model_once() {
        let mut form = form(Services::new());
        form.initialize();
        let first = form.controller().engine().model().unwrap();
        form.initialize();
        let second = form.controller().engine().model().unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(form.controller().engine().generation(), 1);
    }

    #[test]
    fn set_parameters_rebinds_only_on_new_instance() {
        let form = form(Services::new());
        let model = Rc::new(RefCell::new(Login::default()));
        assert!(form.set_parameters(Rc::clone(&model)));
        assert!(!form.set_parameters(Rc::clone(&model)));
        assert!(form.set_parameters(Rc::new(RefCell::new(Login::default()))));
    }

    #[test]
    fn culture_translates_messages() {
        let mut catalog = pagekit_i18n::TranslationCatalog::new();
        let mut de = pagekit_i18n::LocaleTable::new();
        de.insert("The User field is required.", "Das Feld User ist erforderlich.");
        catalog.add_locale("de", de).unwrap();
        let culture = LocaleContext::with_catalog("de", catalog);

        let mut form = form(Services::new().with_culture(Rc::new(culture)));
        form.initialize();

        struct Quiet;
        impl FormHandler<Login> for Quiet {}
        let outcome = block_on(form.submit(&Quiet)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Invalid);

        let messages = form.controller().engine().messages();
        assert_eq!(messages[0].1.text, "Das Feld User ist erforderlich.");
        assert!(messages[0].1.translated);
    }

    #[test]
    fn dispose_suppresses_form_renders() {
        let mut form = form(Services::new());
        form.initialize();
        form.dispose();
        form.controller().engine().notify_field_changed("User");
        assert_eq!(form.page().host().render_handle().request_count(), 0);
        assert!(!form.controller().engine().is_bound());
    }
}
