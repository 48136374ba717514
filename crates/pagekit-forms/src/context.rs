#![forbid(unsafe_code)]

//! Edit context: the events that connect a form's inputs to its validator.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use pagekit_runtime::Event;

use crate::field::{FieldIdentifier, ModelId};

struct Inner<M> {
    id: ModelId,
    model: Rc<RefCell<M>>,
    field_changed: Event<FieldIdentifier>,
    validation_requested: Event<()>,
    validation_state_changed: Event<()>,
}

/// Events for one bound model instance.
///
/// Created by the [`ValidationEngine`](crate::engine::ValidationEngine) on
/// each bind; inputs raise [`notify_field_changed`](Self::notify_field_changed)
/// and the submit path raises [`request_validation`](Self::request_validation).
pub struct EditContext<M: 'static> {
    inner: Rc<Inner<M>>,
}

impl<M: 'static> Clone for EditContext<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: 'static> EditContext<M> {
    pub(crate) fn new(model: Rc<RefCell<M>>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: ModelId::next(),
                model,
                field_changed: Event::new(),
                validation_requested: Event::new(),
                validation_state_changed: Event::new(),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> ModelId {
        self.inner.id
    }

    /// Identifier for `name` on this context's model.
    #[must_use]
    pub fn field(&self, name: &str) -> FieldIdentifier {
        FieldIdentifier::new(self.inner.id, name)
    }

    #[must_use]
    pub fn model(&self) -> &Rc<RefCell<M>> {
        &self.inner.model
    }

    /// Borrow the model.
    ///
    /// # Panics
    ///
    /// Panics if the model is mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, M> {
        self.inner.model.borrow()
    }

    /// Mutably borrow the model.
    ///
    /// # Panics
    ///
    /// Panics if the model is already borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, M> {
        self.inner.model.borrow_mut()
    }

    /// Whether this context wraps exactly `model` (pointer identity).
    #[must_use]
    pub fn is_bound_to(&self, model: &Rc<RefCell<M>>) -> bool {
        Rc::ptr_eq(&self.inner.model, model)
    }

    pub fn notify_field_changed(&self, field: &FieldIdentifier) {
        self.inner.field_changed.emit(field);
    }

    pub fn request_validation(&self) {
        self.inner.validation_requested.emit(&());
    }

    pub(crate) fn notify_validation_state_changed(&self) {
        self.inner.validation_state_changed.emit(&());
    }

    #[must_use]
    pub fn field_changed(&self) -> &Event<FieldIdentifier> {
        &self.inner.field_changed
    }

    #[must_use]
    pub fn validation_requested(&self) -> &Event<()> {
        &self.inner.validation_requested
    }

    /// Fires after every validation pass.
    #[must_use]
    pub fn validation_state_changed(&self) -> &Event<()> {
        &self.inner.validation_state_changed
    }

    /// `(field_changed, validation_requested)` handler counts.
    #[must_use]
    pub fn handler_counts(&self) -> (usize, usize) {
        (
            self.inner.field_changed.subscriber_count(),
            self.inner.validation_requested.subscriber_count(),
        )
    }
}

impl<M: 'static> fmt::Debug for EditContext<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditContext")
            .field("id", &self.inner.id)
            .field("handlers", &self.handler_counts())
            .finish_non_exhaustive()
    }
}
