#![forbid(unsafe_code)]

//! greet binary entry point.

use std::io;
use std::process;

use greet_app::{AppError, GreetApp, cli, headless, logging, program};
use greet_i18n::GREETING_MESSAGE;

fn main() {
    let opts = cli::Opts::parse();
    if let Err(e) = run(&opts) {
        eprintln!("greet: {e}");
        process::exit(1);
    }
}

fn run(opts: &cli::Opts) -> Result<(), AppError> {
    logging::init(opts.log_target())?;

    let catalog = opts.catalog()?;
    let missing = catalog.missing_keys(&opts.locale, &[GREETING_MESSAGE]);
    if !missing.is_empty() {
        tracing::warn!(locale = %opts.locale, ?missing, "locale has no greeting");
    }
    let template = catalog.template(&opts.locale, GREETING_MESSAGE)?;
    tracing::info!(locale = %opts.locale, template = template.source(), "starting");

    if opts.headless {
        let lines = headless::run(template, io::stdin().lock(), io::stdout().lock())?;
        tracing::info!(lines, "done");
        return Ok(());
    }

    let app = GreetApp::new(template)?;
    program::run(app, opts.program_config())
}
