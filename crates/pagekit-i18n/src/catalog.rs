#![forbid(unsafe_code)]

//! Source-text keyed translation tables with locale fallback.
//!
//! # Invariants
//!
//! 1. **Fallback terminates**: a lookup tries the exact locale, then its
//!    primary language subtag (`"pl-PL"` → `"pl"`), then each entry of the
//!    fallback chain once.
//!
//! 2. **Translation is total**: [`TranslationCatalog::translate`] always
//!    returns text. When no table provides the source string, the source
//!    string itself is returned.
//!
//! 3. **Interpolation is single-pass**: `{name}` tokens are replaced once;
//!    substituted values are never re-scanned.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing source string | No table has it | Source text returned |
//! | Missing locale | Locale not loaded | Falls through chain |
//! | Unknown `{name}` | No matching arg | Token left as-is |
//! | Malformed table line | No `=` separator | [`I18nError::Parse`] |
//! | Bad locale tag | Empty or non-ASCII tag | [`I18nError::InvalidLocale`] |

use std::borrow::Cow;
use std::collections::HashMap;

/// Locale identifier (e.g., `"en"`, `"pl-PL"`).
pub type Locale = String;

/// Errors from building translation tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// A locale tag was empty or contained characters other than ASCII
    /// alphanumerics and `-`.
    InvalidLocale(String),
    /// A table line could not be parsed.
    Parse { line: usize, message: String },
    /// The same source string was translated twice in one table.
    DuplicateKey { locale: String, key: String },
}

impl std::fmt::Display for I18nError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLocale(l) => write!(f, "invalid locale: {l:?}"),
            Self::Parse { line, message } => write!(f, "line {line}: {message}"),
            Self::DuplicateKey { locale, key } => {
                write!(f, "duplicate source string '{key}' in locale '{locale}'")
            }
        }
    }
}

impl std::error::Error for I18nError {}

/// Translations for a single locale, keyed by source text.
#[derive(Debug, Clone, Default)]
pub struct LocaleTable {
    entries: HashMap<String, String>,
}

impl LocaleTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a translation, replacing any previous one for `source`.
    pub fn insert(&mut self, source: impl Into<String>, translated: impl Into<String>) {
        self.entries.insert(source.into(), translated.into());
    }

    /// Parse a table from `source = translation` lines.
    ///
    /// Blank lines and lines starting with `#` are skipped. Only the first
    /// `=` separates source from translation, so translations may contain
    /// `=`. Both sides are trimmed.
    pub fn parse(locale: &str, text: &str) -> Result<Self, I18nError> {
        let mut table = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((source, translated)) = line.split_once('=') else {
                return Err(I18nError::Parse {
                    line: idx + 1,
                    message: "expected `source = translation`".into(),
                });
            };
            let source = source.trim();
            if source.is_empty() {
                return Err(I18nError::Parse {
                    line: idx + 1,
                    message: "empty source string".into(),
                });
            }
            if table.entries.contains_key(source) {
                return Err(I18nError::DuplicateKey {
                    locale: locale.to_string(),
                    key: source.to_string(),
                });
            }
            table.insert(source, translated.trim());
        }
        Ok(table)
    }

    /// Translation for `source`, if present.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    /// Number of translated strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Locale tables plus a fallback chain.
///
/// # Example
///
/// ```
/// use pagekit_i18n::{LocaleTable, TranslationCatalog};
///
/// let mut pl = LocaleTable::new();
/// pl.insert("The Name field is required.", "Pole Nazwa jest wymagane.");
/// pl.insert("Hello, {name}!", "Witaj, {name}!");
///
/// let mut catalog = TranslationCatalog::new();
/// catalog.add_locale("pl", pl).unwrap();
///
/// assert_eq!(
///     catalog.translate("pl-PL", "The Name field is required."),
///     "Pole Nazwa jest wymagane."
/// );
/// assert_eq!(catalog.translate("pl", "Untranslated"), "Untranslated");
/// assert_eq!(
///     catalog.format("pl", "Hello, {name}!", &[("name", "Ala")]),
///     "Witaj, Ala!"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct TranslationCatalog {
    tables: HashMap<Locale, LocaleTable>,
    fallback_chain: Vec<Locale>,
}

impl TranslationCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the table for `locale`, replacing an existing one.
    pub fn add_locale(
        &mut self,
        locale: impl Into<String>,
        table: LocaleTable,
    ) -> Result<(), I18nError> {
        let locale = locale.into();
        if !is_valid_tag(&locale) {
            return Err(I18nError::InvalidLocale(locale));
        }
        self.tables.insert(locale, table);
        Ok(())
    }

    /// Set the locales tried, in order, after the requested one.
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// Look up a translation without falling back to the source text.
    #[must_use]
    pub fn lookup(&self, locale: &str, source: &str) -> Option<&str> {
        let primary = primary_subtag(locale);
        let direct = std::iter::once(locale).chain((primary != locale).then_some(primary));
        let chain = self
            .fallback_chain
            .iter()
            .map(String::as_str)
            .filter(|fb| *fb != locale && *fb != primary);

        direct
            .chain(chain)
            .find_map(|tag| self.tables.get(tag).and_then(|t| t.get(source)))
    }

    /// Translate `source` into `locale`, returning the source unchanged when
    /// no table covers it.
    #[must_use]
    pub fn translate<'a>(&'a self, locale: &str, source: &'a str) -> Cow<'a, str> {
        match self.lookup(locale, source) {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Borrowed(source),
        }
    }

    /// Translate `source` and substitute `{name}` tokens from `args`.
    #[must_use]
    pub fn format(&self, locale: &str, source: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.translate(locale, source), args)
    }

    /// Registered locale tags, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

fn primary_subtag(locale: &str) -> &str {
    locale.split('-').next().unwrap_or(locale)
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && !tag.starts_with('-')
        && !tag.ends_with('-')
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Replace `{name}` tokens in one pass. Unknown or unclosed tokens are kept.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match args.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
