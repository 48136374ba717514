#![forbid(unsafe_code)]

//! Translation catalog for pagekit.
//!
//! Strings are keyed by their source text (the text a developer writes in a
//! validation rule or a label), so an untranslated string degrades to the
//! original wording instead of a missing-key marker.

pub mod catalog;

pub use catalog::{I18nError, Locale, LocaleTable, TranslationCatalog, interpolate};
