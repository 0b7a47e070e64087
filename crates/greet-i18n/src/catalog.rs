//! String catalog with locale fallback and JSON loading.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: every lookup walks the chain exactly
//!    once, returning `None` if no locale provides the key.
//!
//! 2. **Templates are validated on resolution**: [`StringCatalog::template`]
//!    only returns templates with exactly one slot.
//!
//! 3. **Thread safety**: `StringCatalog` is `Send + Sync` (all data is
//!    immutable after construction).
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in any locale | `get` returns `None`, `template` errors |
//! | Missing locale | Locale not loaded | Falls through chain |
//! | Malformed JSON | Bad catalog file | [`I18nError::Parse`] |
//! | Bad template | Zero, several, or unknown `%` slots | [`I18nError::SlotCount`] / [`I18nError::BadDirective`] |

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::template::Template;

/// Key of the greeting template rendered by the label.
pub const GREETING_MESSAGE: &str = "greeting_message";

/// Locale identifier (e.g., `"en"`, `"en-US"`, `"bs"`).
pub type Locale = String;

/// Errors from i18n operations.
#[derive(Debug, thiserror::Error)]
pub enum I18nError {
    /// A locale string was malformed.
    #[error("invalid locale: {0}")]
    InvalidLocale(String),
    /// A catalog file could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// A catalog file could not be read.
    #[error("cannot read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// No locale in the chain provides the key.
    #[error("no string for key '{key}' in locale '{locale}' or its fallbacks")]
    MissingKey { locale: String, key: String },
    /// A template did not contain exactly one slot.
    #[error("template must have exactly one slot, found {found}: {template:?}")]
    SlotCount { found: usize, template: String },
    /// A template contained an unsupported `%` directive.
    #[error("unsupported directive '{directive}' in template {template:?}")]
    BadDirective { directive: String, template: String },
}

/// Check that a locale tag looks like `ll`, `ll-RR` or `ll_RR`.
pub fn validate_locale(tag: &str) -> Result<(), I18nError> {
    let valid = !tag.is_empty()
        && tag.len() <= 35
        && tag
            .split(['-', '_'])
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
    if valid {
        Ok(())
    } else {
        Err(I18nError::InvalidLocale(tag.to_string()))
    }
}

/// Strings for a single locale.
#[derive(Debug, Clone, Default)]
pub struct LocaleStrings {
    strings: HashMap<String, String>,
}

impl LocaleStrings {
    /// Create an empty locale string set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a string.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    /// Look up a string by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the locale has no strings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over all keys in this locale.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.strings.keys().map(String::as_str)
    }
}

/// On-disk catalog layout.
///
/// ```json
/// {
///   "fallback": ["en"],
///   "locales": { "en": { "greeting_message": "Hello, %s!" } }
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    fallback: Vec<Locale>,
    locales: BTreeMap<Locale, BTreeMap<String, String>>,
}

/// Central string catalog with locale fallback.
///
/// # Example
///
/// ```
/// use greet_i18n::catalog::{LocaleStrings, StringCatalog};
///
/// let mut catalog = StringCatalog::new();
/// let mut en = LocaleStrings::new();
/// en.insert("greeting_message", "Hello, %s!");
/// catalog.add_locale("en", en);
/// catalog.set_fallback_chain(vec!["en".into()]);
///
/// let t = catalog.template("de", "greeting_message").unwrap();
/// assert_eq!(t.render("Ken"), "Hello, Ken!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringCatalog {
    locales: HashMap<Locale, LocaleStrings>,
    fallback_chain: Vec<Locale>,
}

impl StringCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        const BUILTIN: &[(&str, &str)] = &[
            ("en", "Hello, %s!"),
            ("bs", "Zdravo, %s!"),
            ("de", "Hallo, %s!"),
            ("es", "¡Hola, %s!"),
            ("fr", "Bonjour, %s !"),
        ];

        let mut catalog = Self::new();
        for &(locale, greeting) in BUILTIN {
            let mut strings = LocaleStrings::new();
            strings.insert(GREETING_MESSAGE, greeting);
            catalog.add_locale(locale, strings);
        }
        catalog.set_fallback_chain(vec!["en".into()]);
        catalog
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, I18nError> {
        let file: CatalogFile =
            serde_json::from_str(json).map_err(|e| I18nError::Parse(e.to_string()))?;

        let mut catalog = Self::new();
        for (locale, entries) in file.locales {
            validate_locale(&locale)?;
            let mut strings = LocaleStrings::new();
            for (key, value) in entries {
                strings.insert(key, value);
            }
            catalog.add_locale(locale, strings);
        }
        for locale in &file.fallback {
            validate_locale(locale)?;
        }
        catalog.set_fallback_chain(file.fallback);
        Ok(catalog)
    }

    /// Read and parse a JSON catalog file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, I18nError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| I18nError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            locales = catalog.locales.len(),
            "loaded string catalog"
        );
        Ok(catalog)
    }

    /// Overlay `other` on top of this catalog.
    ///
    /// Keys in `other` win. A non-empty fallback chain in `other` replaces
    /// this one.
    pub fn merge(&mut self, other: StringCatalog) {
        for (locale, strings) in other.locales {
            let target = self.locales.entry(locale).or_default();
            for (key, value) in strings.strings {
                target.strings.insert(key, value);
            }
        }
        if !other.fallback_chain.is_empty() {
            self.fallback_chain = other.fallback_chain;
        }
    }

    /// Add strings for a locale, replacing any previous set.
    pub fn add_locale(&mut self, locale: impl Into<String>, strings: LocaleStrings) {
        self.locales.insert(locale.into(), strings);
    }

    /// Set the fallback chain (tried in order when a key is missing).
    ///
    /// Example: `["es-MX", "es", "en"]`: try Mexican Spanish, then
    /// generic Spanish, then English.
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// Look up a string by key.
    ///
    /// Tries the specified locale first, then its base language (`en` for
    /// `en-US`), then walks the fallback chain.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        if let Some(s) = self.locales.get(locale).and_then(|ls| ls.get(key)) {
            return Some(s);
        }

        if let Some(base) = base_language(locale)
            && let Some(s) = self.locales.get(base).and_then(|ls| ls.get(key))
        {
            return Some(s);
        }

        self.fallback_chain
            .iter()
            .filter(|fallback| fallback.as_str() != locale)
            .find_map(|fallback| self.locales.get(fallback.as_str()).and_then(|ls| ls.get(key)))
    }

    /// Resolve `key` and parse it as a single-slot template.
    pub fn template(&self, locale: &str, key: &str) -> Result<Template, I18nError> {
        let text = self.get(locale, key).ok_or_else(|| I18nError::MissingKey {
            locale: locale.to_string(),
            key: key.to_string(),
        })?;
        Template::parse(text)
    }

    /// All registered locale tags, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Find keys from `reference_keys` that are missing in `locale`
    /// (including fallback chain resolution).
    ///
    /// Returns the missing keys sorted alphabetically.
    #[must_use]
    pub fn missing_keys(&self, locale: &str, reference_keys: &[&str]) -> Vec<String> {
        let mut missing: Vec<String> = reference_keys
            .iter()
            .filter(|key| self.get(locale, key).is_none())
            .map(|key| key.to_string())
            .collect();
        missing.sort_unstable();
        missing
    }
}

/// `"en"` for `"en-US"` / `"en_US"`, `None` for a bare language tag.
fn base_language(locale: &str) -> Option<&str> {
    locale
        .split_once(['-', '_'])
        .map(|(base, _)| base)
        .filter(|base| !base.is_empty())
}
