#![forbid(unsafe_code)]

//! Submission gating.
//!
//! [`FormSubmissionController::submit_if_valid`] validates, then hands the
//! model to the caller's [`FormHandler`] only when validation passed. While
//! the handler runs the controller is [`SubmissionState::Processing`]; it
//! returns to [`SubmissionState::Idle`] when the handler settles, whether it
//! succeeded, failed or its future was dropped.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use pagekit_runtime::{BoxError, Observable, RenderHandle};

use crate::engine::ValidationEngine;
use crate::error::FormError;
use crate::field::FieldIdentifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Processing,
}

/// What a submit attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Valid; the handler ran and succeeded.
    Submitted,
    /// Invalid; the handler was not invoked.
    Invalid,
    /// A previous submit is still processing; nothing was done.
    AlreadyProcessing,
}

/// Caller-supplied hooks. Both default to no-ops.
pub trait FormHandler<M> {
    /// Process a validated model.
    fn submit(&self, model: Rc<RefCell<M>>) -> LocalBoxFuture<'_, Result<(), BoxError>> {
        let _ = model;
        Box::pin(async { Ok(()) })
    }

    /// Called once per stored message after an invalid submit.
    fn invalid_message(&self, field: &FieldIdentifier, message: &str) {
        let _ = (field, message);
    }
}

/// Sets `Processing` on creation and `Idle` on drop.
struct ProcessingGuard<'a> {
    state: &'a Observable<SubmissionState>,
    render: &'a RenderHandle,
}

impl<'a> ProcessingGuard<'a> {
    fn enter(state: &'a Observable<SubmissionState>, render: &'a RenderHandle) -> Self {
        state.set(SubmissionState::Processing);
        render.request();
        Self { state, render }
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.state.set(SubmissionState::Idle);
        self.render.request();
    }
}

/// Validation engine plus a processing flag.
pub struct FormSubmissionController<M: 'static> {
    engine: ValidationEngine<M>,
    state: Observable<SubmissionState>,
}

impl<M: 'static> FormSubmissionController<M> {
    #[must_use]
    pub fn new(engine: ValidationEngine<M>) -> Self {
        Self {
            engine,
            state: Observable::default(),
        }
    }

    /// Validate, then run `handler.submit` if valid.
    ///
    /// The handler receives the instance that was validated. An invalid
    /// model leaves the state untouched and requests nothing. Handler errors
    /// are returned as [`FormError::Submit`]; the state is back to `Idle`
    /// either way.
    pub async fn submit_if_valid(
        &self,
        handler: &dyn FormHandler<M>,
    ) -> Result<SubmitOutcome, FormError> {
        if self.is_processing() {
            tracing::debug!("submit ignored while processing");
            return Ok(SubmitOutcome::AlreadyProcessing);
        }
        let validated = self.engine.model();
        let generation = self.engine.generation();
        if !self.engine.validate() || self.engine.generation() != generation {
            return Ok(SubmitOutcome::Invalid);
        }
        let model = validated.ok_or(FormError::Unbound)?;

        let _processing = ProcessingGuard::enter(&self.state, self.engine.render_handle());
        handler.submit(model).await.map_err(FormError::Submit)?;
        Ok(SubmitOutcome::Submitted)
    }

    /// Report every stored message to `handler.invalid_message`,
    /// translating those not translated yet. Returns how many were reported.
    pub fn handle_invalid_submit(&self, handler: &dyn FormHandler<M>) -> usize {
        let translator = self.engine.translator();
        let messages = self.engine.messages();
        for (field, message) in &messages {
            match translator {
                Some(t) if !message.translated => {
                    handler.invalid_message(field, &t.translate(&message.text));
                }
                _ => handler.invalid_message(field, &message.text),
            }
        }
        messages.len()
    }

    /// Full submit: [`submit_if_valid`](Self::submit_if_valid), then, when
    /// invalid, [`handle_invalid_submit`](Self::handle_invalid_submit) and a
    /// re-render so the messages show.
    pub async fn submit(&self, handler: &dyn FormHandler<M>) -> Result<SubmitOutcome, FormError> {
        let outcome = self.submit_if_valid(handler).await?;
        if outcome == SubmitOutcome::Invalid {
            self.handle_invalid_submit(handler);
            self.engine.render_handle().request();
        }
        Ok(outcome)
    }

    /// Run validation and report the result.
    pub fn is_valid(&self) -> bool {
        self.engine.validate()
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.state.get() == SubmissionState::Processing
    }

    #[must_use]
    pub fn state(&self) -> &Observable<SubmissionState> {
        &self.state
    }

    #[must_use]
    pub fn engine(&self) -> &ValidationEngine<M> {
        &self.engine
    }

    pub fn dispose(&self) {
        self.engine.dispose();
    }
}

impl<M: 'static> fmt::Debug for FormSubmissionController<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSubmissionController")
            .field("engine", &self.engine)
            .field("state", &self.state.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;
    use futures::FutureExt;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[derive(Default)]
    struct Note {
        title: String,
    }

    fn controller() -> FormSubmissionController<Note> {
        let rules = Rules::new().required("Title", |n: &Note| n.title.as_str());
        FormSubmissionController::new(ValidationEngine::new(
            Rc::new(rules),
            RenderHandle::noop(),
        ))
    }

    #[derive(Default)]
    struct Recorder {
        submitted: Cell<u32>,
        fail: bool,
        invalid: RefCell<Vec<String>>,
    }

    impl FormHandler<Note> for Recorder {
        fn submit(&self, _model: Rc<RefCell<Note>>) -> LocalBoxFuture<'_, Result<(), BoxError>> {
            self.submitted.set(self.submitted.get() + 1);
            Box::pin(async move {
                if self.fail {
                    Err(BoxError::from("remote rejected"))
                } else {
                    Ok(())
                }
            })
        }

        fn invalid_message(&self, _field: &FieldIdentifier, message: &str) {
            self.invalid.borrow_mut().push(message.to_string());
        }
    }

    #[test]
    fn default_handler_is_a_noop() {
        struct Nothing;
        impl FormHandler<Note> for Nothing {}

        let controller = controller();
        controller.engine().bind(Rc::new(RefCell::new(Note {
            title: "hi".into(),
        })));
        let outcome = block_on(controller.submit_if_valid(&Nothing)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Submitted);
        assert_eq!(controller.handle_invalid_submit(&Nothing), 0);
    }

    #[test]
    fn processing_flag_tracks_handler() {
        let controller = controller();
        controller.engine().bind(Rc::new(RefCell::new(Note {
            title: "hi".into(),
        })));
        let recorder = Recorder::default();
        let states = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&states);
        let _sub = controller.state().subscribe(move |s| log.borrow_mut().push(*s));

        block_on(controller.submit_if_valid(&recorder)).unwrap();
        assert_eq!(
            *states.borrow(),
            vec![SubmissionState::Processing, SubmissionState::Idle]
        );
        assert_eq!(recorder.submitted.get(), 1);
        assert_eq!(controller.engine().render_handle().request_count(), 2);
    }

    #[test]
    fn handler_error_propagates_and_resets() {
        let controller = controller();
        controller.engine().bind(Rc::new(RefCell::new(Note {
            title: "hi".into(),
        })));
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let err = block_on(controller.submit_if_valid(&recorder)).unwrap_err();
        assert!(matches!(err, FormError::Submit(_)));
        assert_eq!(err.to_string(), "submit handler failed: remote rejected");
        assert!(!controller.is_processing());
    }

    #[test]
    fn invalid_submit_reports_messages() {
        let controller = controller();
        controller.engine().bind(Rc::new(RefCell::new(Note::default())));
        let recorder = Recorder::default();

        let outcome = block_on(controller.submit(&recorder)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(recorder.submitted.get(), 0);
        assert_eq!(*recorder.invalid.borrow(), ["The Title field is required."]);
        assert_eq!(controller.state().version(), 0);
    }

    #[test]
    fn dropped_submit_future_resets_state() {
        let controller = controller();
        controller.engine().bind(Rc::new(RefCell::new(Note {
            title: "hi".into(),
        })));
        struct Never;
        impl FormHandler<Note> for Never {
            fn submit(&self, _model: Rc<RefCell<Note>>) -> LocalBoxFuture<'_, Result<(), BoxError>> {
                Box::pin(futures::future::pending())
            }
        }

        let mut fut = Box::pin(controller.submit_if_valid(&Never));
        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(fut.poll_unpin(&mut cx).is_pending());
        assert!(controller.is_processing());

        let again = block_on(controller.submit_if_valid(&Never)).unwrap();
        assert_eq!(again, SubmitOutcome::AlreadyProcessing);

        drop(fut);
        assert!(!controller.is_processing());
    }

    #[test]
    fn model_swapped_during_validation_is_not_submitted() {
        let controller = Rc::new(controller());
        controller.engine().bind(Rc::new(RefCell::new(Note::default())));
        let weak = Rc::downgrade(&controller);
        let swapped = Rc::new(Cell::new(false));
        let flag = Rc::clone(&swapped);
        let _sub = controller
            .engine()
            .context()
            .unwrap()
            .validation_state_changed()
            .subscribe(move |()| {
                if flag.replace(true) {
                    return;
                }
                if let Some(controller) = weak.upgrade() {
                    controller.engine().reset(Rc::new(RefCell::new(Note {
                        title: "filled later".into(),
                    })));
                }
            });
        let recorder = Recorder::default();

        let outcome = block_on(controller.submit_if_valid(&recorder)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(swapped.get());
        assert_eq!(recorder.submitted.get(), 0);
        assert!(!controller.is_processing());
    }

    #[test]
    fn invalid_submit_if_valid_requests_no_render() {
        let controller = controller();
        controller.engine().bind(Rc::new(RefCell::new(Note::default())));
        let recorder = Recorder::default();

        block_on(controller.submit_if_valid(&recorder)).unwrap();
        assert_eq!(controller.engine().render_handle().request_count(), 0);
        assert_eq!(controller.state().version(), 0);

        block_on(controller.submit(&recorder)).unwrap();
        assert_eq!(controller.engine().render_handle().request_count(), 1);
    }
}
