#![forbid(unsafe_code)]

//! Forms for pagekit.
//!
//! This crate provides:
//! - [`ValidationEngine`]: binds one model instance at a time to a
//!   [`ValidationMessageStore`] and validates it on request
//! - [`Rules`] and [`ModelValidator`] for describing validation
//! - [`FormSubmissionController`]: validate-then-submit with a processing flag
//! - [`FormPage`]: a [`Page`](pagekit_runtime::Page) carrying a form

pub mod context;
pub mod engine;
pub mod error;
pub mod field;
pub mod page;
pub mod rules;
pub mod store;
pub mod submit;

pub use context::EditContext;
pub use engine::ValidationEngine;
pub use error::FormError;
pub use field::{FieldIdentifier, ModelId};
pub use page::FormPage;
pub use rules::{ModelValidator, Rules, ValidationFailure};
pub use store::{ValidationMessage, ValidationMessageStore};
pub use submit::{FormHandler, FormSubmissionController, SubmissionState, SubmitOutcome};
