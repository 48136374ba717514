#![forbid(unsafe_code)]

//! Form errors.
//!
//! Validation failures are not errors; they surface as messages in the
//! [`ValidationMessageStore`](crate::store::ValidationMessageStore). What
//! remains is misuse of the store and failures raised by the caller's submit
//! handler.

use pagekit_runtime::BoxError;
use thiserror::Error;

use crate::field::FieldIdentifier;

#[derive(Debug, Error)]
pub enum FormError {
    /// A message was keyed to a field of a model other than the bound one.
    #[error("field `{field}` does not belong to the bound model")]
    ForeignField { field: FieldIdentifier },

    /// No model is bound.
    #[error("no model bound to the form")]
    Unbound,

    /// The caller's submit handler failed.
    #[error("submit handler failed: {0}")]
    Submit(#[source] BoxError),
}
