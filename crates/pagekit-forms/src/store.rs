#![forbid(unsafe_code)]

//! Field-keyed validation messages.

use crate::error::FormError;
use crate::field::{FieldIdentifier, ModelId};

/// One validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub text: String,
    /// Whether `text` already went through the culture translator.
    pub translated: bool,
}

impl ValidationMessage {
    #[must_use]
    pub fn translated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translated: true,
        }
    }

    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            translated: false,
        }
    }
}

/// Messages for one bound model, keyed by field.
///
/// # Invariants
///
/// 1. Every key belongs to [`owner`](Self::owner); foreign keys are rejected.
/// 2. Fields keep first-insertion order and messages keep append order.
/// 3. A field with no messages has no entry.
#[derive(Debug, Clone)]
pub struct ValidationMessageStore {
    owner: ModelId,
    entries: Vec<(FieldIdentifier, Vec<ValidationMessage>)>,
}

impl ValidationMessageStore {
    #[must_use]
    pub fn new(owner: ModelId) -> Self {
        Self {
            owner,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn owner(&self) -> ModelId {
        self.owner
    }

    /// Append `message` under `field`.
    pub fn add(
        &mut self,
        field: &FieldIdentifier,
        message: ValidationMessage,
    ) -> Result<(), FormError> {
        if field.model() != self.owner {
            return Err(FormError::ForeignField {
                field: field.clone(),
            });
        }
        self.push(field.clone(), message);
        Ok(())
    }

    pub(crate) fn push(&mut self, field: FieldIdentifier, message: ValidationMessage) {
        match self.entries.iter_mut().find(|(key, _)| *key == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    /// Messages for `field`, in insertion order.
    #[must_use]
    pub fn messages_for(&self, field: &FieldIdentifier) -> &[ValidationMessage] {
        self.entries
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn clear_field(&mut self, field: &FieldIdentifier) {
        self.entries.retain(|(key, _)| key != field);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldIdentifier, &ValidationMessage)> {
        self.entries
            .iter()
            .flat_map(|(field, messages)| messages.iter().map(move |m| (field, m)))
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldIdentifier> {
        self.entries.iter().map(|(field, _)| field)
    }
}
