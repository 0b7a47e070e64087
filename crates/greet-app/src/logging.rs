//! Tracing subscriber setup.
//!
//! The full-screen UI owns stdout and stderr is hidden behind the alternate
//! screen, so terminal mode logs only to a file. Headless mode logs to
//! stderr. Filter directives come from `GREET_LOG` (default `warn`).

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "GREET_LOG";

const DEFAULT_DIRECTIVES: &str = "warn";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stderr,
    File(PathBuf),
}

/// Install the global subscriber. Calling it twice is an error.
pub fn init(target: LogTarget) -> Result<(), AppError> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let installed = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_thread_names(true)
                .try_init()
        }
    };
    installed.map_err(|err| AppError::Logging(err.to_string()))
}
