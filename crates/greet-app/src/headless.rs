//! Line-oriented mode: each input line is one text-change event.
//!
//! The initial greeting is written first, then one greeting per line read.
//! Handy for pipes (`printf 'K\nKe\nKen\n' | greet --headless`) and tests.
//!
//! Lines are forwarded verbatim: tabs and other control characters reach the
//! name unchanged, a repeated line is still a new update, and bytes that are
//! not valid UTF-8 are replaced with U+FFFD instead of ending the run.

use std::io::{BufRead, Write};

use greet_i18n::Template;

use crate::app::GreetApp;
use crate::error::AppError;

/// Run until `input` is exhausted. Returns the number of lines processed.
pub fn run<R: BufRead, W: Write>(template: Template, input: R, out: W) -> Result<usize, AppError> {
    let mut app = GreetApp::new(template)?;
    let lines = feed_lines(&mut app, input, out)?;
    app.shutdown();
    tracing::debug!(lines, "headless input exhausted");
    Ok(lines)
}

/// Write the current greeting, then forward each line of `input` and write
/// the greeting it produced.
pub fn feed_lines<R: BufRead, W: Write>(
    app: &mut GreetApp,
    mut input: R,
    mut out: W,
) -> Result<usize, AppError> {
    writeln!(out, "{}", app.greeting())?;

    let mut buf = Vec::new();
    let mut lines = 0;
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(strip_newline(&buf));
        app.text_changed(&line);
        writeln!(out, "{}", app.greeting())?;
        lines += 1;
    }
    out.flush()?;
    Ok(lines)
}

fn strip_newline(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
