#![forbid(unsafe_code)]

//! Internationalization (i18n) for greet.
//!
//! Provides externalized string storage with key-based lookup, locale
//! fallback chains, JSON catalog loading, and the single-slot templates the
//! greeting label is rendered from.

pub mod catalog;
pub mod template;

pub use catalog::{GREETING_MESSAGE, I18nError, LocaleStrings, StringCatalog, validate_locale};
pub use template::{EMPTY_NAME, Template};
