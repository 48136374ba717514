#![forbid(unsafe_code)]

//! Model binding and validation.
//!
//! [`ValidationEngine`] owns the one active binding between a view model and
//! its [`ValidationMessageStore`]. A binding is an [`EditContext`] plus two
//! handlers on it:
//!
//! - *field changed*: request a re-render (no automatic revalidation);
//! - *validation requested*: clear the store, run the validator, store one
//!   translated message per affected field per failure.
//!
//! # Invariants
//!
//! 1. At most one binding is active. Rebinding detaches the previous
//!    binding's handlers before the new ones are attached.
//! 2. Binding the instance that is already bound is a no-op;
//!    [`reset`](ValidationEngine::reset) always rebuilds.
//! 3. A rebuilt binding gets a fresh store keyed by a fresh
//!    [`ModelId`](crate::field::ModelId), so messages never leak across
//!    model instances.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use pagekit_runtime::{Event, RenderHandle, Subscription, Translator};

use crate::context::EditContext;
use crate::error::FormError;
use crate::field::FieldIdentifier;
use crate::rules::ModelValidator;
use crate::store::{ValidationMessage, ValidationMessageStore};

struct Binding<M: 'static> {
    context: EditContext<M>,
    store: Rc<RefCell<ValidationMessageStore>>,
    on_field_changed: Subscription,
    on_validation_requested: Subscription,
}

impl<M: 'static> Binding<M> {
    fn detach(mut self) {
        for (name, sub) in [
            ("field_changed", &mut self.on_field_changed),
            ("validation_requested", &mut self.on_validation_requested),
        ] {
            if let Err(err) = sub.release() {
                tracing::debug!(handler = name, error = %err, "binding handler detach skipped");
            }
        }
        self.store.borrow_mut().clear();
    }
}

/// Binds a model to a message store and runs validation on request.
pub struct ValidationEngine<M: 'static> {
    validator: Rc<dyn ModelValidator<M>>,
    translator: Option<Rc<dyn Translator>>,
    render: RenderHandle,
    binding: RefCell<Option<Binding<M>>>,
    generation: Cell<u64>,
}

impl<M: 'static> ValidationEngine<M> {
    #[must_use]
    pub fn new(validator: Rc<dyn ModelValidator<M>>, render: RenderHandle) -> Self {
        Self {
            validator,
            translator: None,
            render,
            binding: RefCell::new(None),
            generation: Cell::new(0),
        }
    }

    /// Translate stored messages through `translator`.
    #[must_use]
    pub fn with_translator(mut self, translator: Rc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    #[must_use]
    pub fn translator(&self) -> Option<&Rc<dyn Translator>> {
        self.translator.as_ref()
    }

    /// Bind `model` unless it is already the bound instance. Returns whether
    /// a new binding was built.
    pub fn bind(&self, model: Rc<RefCell<M>>) -> bool {
        let same = self
            .binding
            .borrow()
            .as_ref()
            .is_some_and(|b| b.context.is_bound_to(&model));
        if same {
            return false;
        }
        self.rebind(model);
        true
    }

    /// Rebuild the binding around `model`, even if it is already bound.
    pub fn reset(&self, model: Rc<RefCell<M>>) {
        self.rebind(model);
    }

    /// Start over with a default model. Returns the new model.
    pub fn reset_default(&self) -> Rc<RefCell<M>>
    where
        M: Default,
    {
        let model = Rc::new(RefCell::new(M::default()));
        self.rebind(Rc::clone(&model));
        model
    }

    fn rebind(&self, model: Rc<RefCell<M>>) {
        let previous = self.binding.borrow_mut().take();
        if let Some(previous) = previous {
            tracing::debug!(model = %previous.context.id().get(), "detaching previous binding");
            previous.detach();
        }

        let context = EditContext::new(model);
        let store = Rc::new(RefCell::new(ValidationMessageStore::new(context.id())));

        let render = self.render.clone();
        let on_field_changed = context.field_changed().subscribe(move |field| {
            tracing::trace!(field = %field, "field changed");
            render.request();
        });
        let on_validation_requested = context.validation_requested().subscribe(validate_handler(
            &context,
            Rc::clone(&store),
            Rc::clone(&self.validator),
            self.translator.clone(),
        ));

        self.generation.set(self.generation.get() + 1);
        tracing::debug!(
            model = %context.id().get(),
            generation = self.generation.get(),
            "model bound"
        );
        *self.binding.borrow_mut() = Some(Binding {
            context,
            store,
            on_field_changed,
            on_validation_requested,
        });
    }

    /// Validate the bound model. Returns `true` when no messages remain;
    /// `false` when invalid or when nothing is bound.
    ///
    /// If a handler rebinds the engine while the pass runs, the result is
    /// `false`: the newly bound model was never validated.
    ///
    /// # Panics
    ///
    /// Panics if the model is mutably borrowed during the call.
    pub fn validate(&self) -> bool {
        let Some((context, store)) = self
            .binding
            .borrow()
            .as_ref()
            .map(|b| (b.context.clone(), Rc::clone(&b.store)))
        else {
            tracing::debug!("validate called with no model bound");
            return false;
        };
        let generation = self.generation.get();
        context.request_validation();
        if self.generation.get() != generation {
            tracing::debug!("binding replaced during validation; result discarded");
            return false;
        }
        store.borrow().is_empty()
    }

    /// Append `message` for `field` without validating.
    pub fn add_message(
        &self,
        field: &FieldIdentifier,
        message: impl Into<String>,
    ) -> Result<(), FormError> {
        let context = {
            let binding = self.binding.borrow();
            let binding = binding.as_ref().ok_or(FormError::Unbound)?;
            binding
                .store
                .borrow_mut()
                .add(field, ValidationMessage::raw(message))?;
            binding.context.clone()
        };
        context.notify_validation_state_changed();
        Ok(())
    }

    /// Raise a field-changed notification for `name` on the bound model.
    pub fn notify_field_changed(&self, name: &str) {
        if let Some(context) = self.context() {
            context.notify_field_changed(&context.field(name));
        }
    }

    /// Identifier for `name` on the bound model.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldIdentifier> {
        self.binding.borrow().as_ref().map(|b| b.context.field(name))
    }

    #[must_use]
    pub fn messages_for(&self, field: &FieldIdentifier) -> Vec<ValidationMessage> {
        self.with_store(|store| store.messages_for(field).to_vec())
            .unwrap_or_default()
    }

    /// Every stored message with its field, in store order.
    #[must_use]
    pub fn messages(&self) -> Vec<(FieldIdentifier, ValidationMessage)> {
        self.with_store(|store| {
            store
                .iter()
                .map(|(field, message)| (field.clone(), message.clone()))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Run `f` against the bound store.
    pub fn with_store<R>(&self, f: impl FnOnce(&ValidationMessageStore) -> R) -> Option<R> {
        self.binding.borrow().as_ref().map(|b| f(&*b.store.borrow()))
    }

    #[must_use]
    pub fn model(&self) -> Option<Rc<RefCell<M>>> {
        self.binding
            .borrow()
            .as_ref()
            .map(|b| Rc::clone(b.context.model()))
    }

    #[must_use]
    pub fn context(&self) -> Option<EditContext<M>> {
        self.binding.borrow().as_ref().map(|b| b.context.clone())
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.binding.borrow().is_some()
    }

    /// Number of bindings built so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    #[must_use]
    pub fn render_handle(&self) -> &RenderHandle {
        &self.render
    }

    /// Detach the binding and drop its messages. Idempotent.
    pub fn dispose(&self) {
        let binding = self.binding.borrow_mut().take();
        if let Some(binding) = binding {
            binding.detach();
        }
    }
}

fn validate_handler<M: 'static>(
    context: &EditContext<M>,
    store: Rc<RefCell<ValidationMessageStore>>,
    validator: Rc<dyn ModelValidator<M>>,
    translator: Option<Rc<dyn Translator>>,
) -> impl Fn(&()) + 'static {
    let model = Rc::clone(context.model());
    let id = context.id();
    let state_changed: Event<()> = context.validation_state_changed().clone();
    move |()| {
        let failures = validator.validate(&model.borrow());
        {
            let mut store = store.borrow_mut();
            store.clear();
            for failure in failures {
                let message = match &translator {
                    Some(t) => ValidationMessage::translated(t.translate(&failure.message)),
                    None => ValidationMessage::raw(failure.message),
                };
                if failure.members.is_empty() {
                    store.push(FieldIdentifier::object(id), message);
                    continue;
                }
                for member in &failure.members {
                    store.push(FieldIdentifier::new(id, member.as_str()), message.clone());
                }
            }
            tracing::debug!(messages = store.len(), "validation pass finished");
        }
        state_changed.emit(&());
    }
}

impl<M: 'static> Drop for ValidationEngine<M> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<M: 'static> fmt::Debug for ValidationEngine<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("bound", &self.is_bound())
            .field("generation", &self.generation.get())
            .field("translator", &self.translator.is_some())
            .finish_non_exhaustive()
    }
}
