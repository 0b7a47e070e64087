#![forbid(unsafe_code)]

//! Command-line argument parsing for the greeter.
//!
//! Parses args manually (no external dependencies) to keep the binary lean.
//! Supports environment variable overrides via the `GREET_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use greet_i18n::{I18nError, StringCatalog, validate_locale};

use crate::feed::FeedConfig;
use crate::logging::LogTarget;
use crate::program::ProgramConfig;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
greet: type a name, watch the greeting follow

USAGE:
    greet [OPTIONS]

OPTIONS:
    --locale=TAG            Locale for the greeting template (default: from LANG, else en)
    --strings=PATH          JSON string catalog layered over the built-in one
    --headless              Read one name per stdin line, print each greeting
    --feed=TEXT             Type TEXT from a background thread, one grapheme per tick
    --feed-interval-ms=N    Delay between fed graphemes (default: 250)
    --tick-ms=N             Input poll interval in ms (default: 100)
    --log-file=PATH         Write logs to PATH (terminal mode logs nowhere otherwise)
    --help, -h              Show this help message
    --version, -V           Show version

KEYBINDINGS:
    Left / Right / Home / End   Move the caret
    Ctrl+A / Ctrl+E             Caret to start / end
    Backspace / Delete          Delete a character
    Ctrl+W / Ctrl+Backspace     Delete the previous word
    Ctrl+U                      Clear the field
    Esc / Ctrl+C                Quit

ENVIRONMENT VARIABLES:
    GREET_LOCALE            Override --locale
    GREET_STRINGS           Override --strings
    GREET_HEADLESS          Enable headless mode (1/true)
    GREET_FEED              Override --feed
    GREET_FEED_INTERVAL_MS  Override --feed-interval-ms
    GREET_TICK_MS           Override --tick-ms
    GREET_LOG_FILE          Override --log-file
    GREET_LOG               Log filter directives (default: warn)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Locale tag used to resolve the greeting template.
    pub locale: String,
    /// Extra catalog merged over the built-in strings.
    pub strings: Option<PathBuf>,
    /// Line-oriented mode instead of the full-screen UI.
    pub headless: bool,
    /// Text typed by the background feed thread.
    pub feed: Option<String>,
    /// Delay between fed graphemes, in milliseconds.
    pub feed_interval_ms: u64,
    /// Input poll interval, in milliseconds.
    pub tick_ms: u64,
    /// Log destination in terminal mode.
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            locale: "en".into(),
            strings: None,
            headless: false,
            feed: None,
            feed_interval_ms: 250,
            tick_ms: 100,
            log_file: None,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("greet {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = get_env("LANG")
            && let Some(tag) = locale_from_lang(&val)
        {
            opts.locale = tag;
        }
        if let Some(val) = get_env("GREET_LOCALE")
            && validate_locale(val.trim()).is_ok()
        {
            opts.locale = val.trim().to_string();
        }
        if let Some(val) = get_env("GREET_STRINGS")
            && !val.trim().is_empty()
        {
            opts.strings = Some(PathBuf::from(val));
        }
        if let Some(val) = get_env("GREET_HEADLESS") {
            opts.headless = env_flag(&val);
        }
        if let Some(val) = get_env("GREET_FEED")
            && !val.is_empty()
        {
            opts.feed = Some(val);
        }
        if let Some(val) = get_env("GREET_FEED_INTERVAL_MS")
            && let Ok(n) = val.parse()
        {
            opts.feed_interval_ms = n;
        }
        if let Some(val) = get_env("GREET_TICK_MS")
            && let Ok(n) = val.parse()
        {
            opts.tick_ms = n;
        }
        if let Some(val) = get_env("GREET_LOG_FILE")
            && !val.trim().is_empty()
        {
            opts.log_file = Some(PathBuf::from(val));
        }

        // Parse command-line args (override env vars)
        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--headless" => opts.headless = true,
                other => {
                    if let Some(val) = other.strip_prefix("--locale=") {
                        if validate_locale(val).is_err() {
                            return Err(ParseError::InvalidValue {
                                flag: "--locale",
                                value: val.to_string(),
                            });
                        }
                        opts.locale = val.to_string();
                    } else if let Some(val) = other.strip_prefix("--strings=") {
                        opts.strings = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--feed=") {
                        opts.feed = (!val.is_empty()).then(|| val.to_string());
                    } else if let Some(val) = other.strip_prefix("--feed-interval-ms=") {
                        opts.feed_interval_ms = parse_number("--feed-interval-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--tick-ms=") {
                        opts.tick_ms = parse_number("--tick-ms", val)?;
                    } else if let Some(val) = other.strip_prefix("--log-file=") {
                        opts.log_file = Some(PathBuf::from(val));
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        if opts.tick_ms == 0 {
            return Err(ParseError::InvalidValue {
                flag: "--tick-ms",
                value: "0".into(),
            });
        }

        Ok(opts)
    }

    /// Built-in strings, overlaid with `--strings` when given.
    pub fn catalog(&self) -> Result<StringCatalog, I18nError> {
        let mut catalog = StringCatalog::builtin();
        if let Some(path) = &self.strings {
            catalog.merge(StringCatalog::load_json(path)?);
        }
        Ok(catalog)
    }

    /// Where logs should go for the selected mode.
    #[must_use]
    pub fn log_target(&self) -> LogTarget {
        match (&self.log_file, self.headless) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, true) => LogTarget::Stderr,
            (None, false) => LogTarget::Off,
        }
    }

    #[must_use]
    pub fn program_config(&self) -> ProgramConfig {
        ProgramConfig {
            tick: Duration::from_millis(self.tick_ms),
            feed: self.feed.as_ref().map(|text| FeedConfig {
                text: text.clone(),
                interval: Duration::from_millis(self.feed_interval_ms),
            }),
        }
    }
}

fn parse_number(flag: &'static str, val: &str) -> Result<u64, ParseError> {
    val.parse().map_err(|_| ParseError::InvalidValue {
        flag,
        value: val.to_string(),
    })
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// `"de_DE.UTF-8"` → `"de_DE"`. `C` and `POSIX` carry no language.
fn locale_from_lang(lang: &str) -> Option<String> {
    let tag = lang.split(['.', '@']).next()?.trim();
    if tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
        return None;
    }
    validate_locale(tag).ok().map(|()| tag.to_string())
}
