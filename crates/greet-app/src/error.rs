use greet_i18n::I18nError;

use crate::controller::ControllerError;

/// Errors that abort the greeter at startup or in the event loop.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    I18n(#[from] I18nError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error("logging setup failed: {0}")]
    Logging(String),
}
