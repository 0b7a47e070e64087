//! RAII terminal session and full-screen drawing.
//!
//! [`TerminalSession::enter`] switches to raw mode and the alternate screen;
//! dropping the session restores the terminal even on early return or panic
//! unwinding. All output goes through [`TerminalSession::draw`], so there is
//! exactly one writer to the terminal.

use std::io::{self, Stdout, Write};

use crossterm::{cursor, execute, queue, style, terminal};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

pub struct TerminalSession {
    out: Stdout,
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession").finish_non_exhaustive()
    }
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(err) = execute!(out, terminal::EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(err);
        }
        tracing::debug!("terminal session entered");
        Ok(Self { out })
    }

    /// Current terminal size as `(columns, rows)`.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    /// Redraw the whole screen and place the caret.
    pub fn draw(&mut self, lines: &[String], caret: (u16, u16)) -> io::Result<()> {
        let (width, height) = self.size()?;
        queue!(
            self.out,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        for (row, line) in lines.iter().enumerate().take(usize::from(height)) {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(
                self.out,
                cursor::MoveTo(0, row),
                style::Print(fit_width(line, usize::from(width)))
            )?;
        }
        let (column, row) = caret;
        queue!(
            self.out,
            cursor::MoveTo(column.min(width.saturating_sub(1)), row),
            cursor::Show
        )?;
        self.out.flush()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        tracing::debug!("terminal session restored");
    }
}

/// Truncate `line` to at most `width` display columns on a grapheme boundary.
#[must_use]
pub fn fit_width(line: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, grapheme) in line.grapheme_indices(true) {
        let w = grapheme.width();
        if used + w > width {
            return &line[..idx];
        }
        used += w;
    }
    line
}
