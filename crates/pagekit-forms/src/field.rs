#![forbid(unsafe_code)]

//! Field identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one bound model instance.
///
/// A fresh id is allocated for every binding, so identifiers from a replaced
/// model never alias keys of the current store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// `(model, field name)` key for validation messages. The empty name marks
/// whole-object messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldIdentifier {
    model: ModelId,
    name: String,
}

impl FieldIdentifier {
    #[must_use]
    pub fn new(model: ModelId, name: impl Into<String>) -> Self {
        Self {
            model,
            name: name.into(),
        }
    }

    /// Identifier for messages about the model as a whole.
    #[must_use]
    pub fn object(model: ModelId) -> Self {
        Self::new(model, String::new())
    }

    #[must_use]
    pub fn model(&self) -> ModelId {
        self.model
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_object_level(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for FieldIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_object_level() {
            write!(f, "#{}", self.model.0)
        } else {
            write!(f, "#{}.{}", self.model.0, self.name)
        }
    }
}
