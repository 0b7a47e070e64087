//! Label and single-line text field.
//!
//! # Invariants
//!
//! 1. The field's cursor is a grapheme index in `0..=grapheme_count()`.
//! 2. Every edit that changes the content returns exactly one
//!    [`TextChange`]; cursor movement and no-op edits return `None`.
//! 3. The field never holds control characters, so it always fits on one line.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Something whose text is replaced when the controller re-renders.
pub trait DisplayTarget {
    /// Replace the displayed text.
    fn set_text(&mut self, text: String);

    /// The currently displayed text.
    fn text(&self) -> &str;
}

/// A plain text label.
#[derive(Debug, Clone, Default)]
pub struct Label {
    text: String,
    renders: u64,
}

impl Label {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times the text has been set.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

impl DisplayTarget for Label {
    fn set_text(&mut self, text: String) {
        self.text = text;
        self.renders += 1;
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// Change event emitted by [`TextField`].
///
/// `text` is the field's full content after the edit; a cleared field
/// reports `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub text: Option<String>,
}

/// Grapheme-aware single-line editor.
///
/// ```
/// use greet_app::widgets::TextField;
///
/// let mut field = TextField::new();
/// field.insert_text("Ken");
/// field.move_left();
/// let change = field.delete_backward().unwrap();
/// assert_eq!(change.text.as_deref(), Some("Kn"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextField {
    text: String,
    /// Cursor position in graphemes.
    cursor: usize,
}

impl TextField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[must_use]
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Display columns between the start of the field and the cursor.
    #[must_use]
    pub fn cursor_column(&self) -> usize {
        self.text[..self.byte_offset(self.cursor)].width()
    }

    pub fn insert_char(&mut self, ch: char) -> Option<TextChange> {
        if ch.is_control() {
            return None;
        }
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        self.cursor = self.text[..at + ch.len_utf8()].graphemes(true).count();
        Some(self.change())
    }

    /// Insert a string at the cursor. Control characters are dropped.
    pub fn insert_text(&mut self, text: &str) -> Option<TextChange> {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        if clean.is_empty() {
            return None;
        }
        let at = self.byte_offset(self.cursor);
        self.text.insert_str(at, &clean);
        self.cursor = self.text[..at + clean.len()].graphemes(true).count();
        Some(self.change())
    }

    /// Replace the whole content and put the cursor at the end.
    pub fn set_text(&mut self, text: &str) -> Option<TextChange> {
        let clean: String = text.chars().filter(|c| !c.is_control()).collect();
        if clean == self.text {
            return None;
        }
        self.text = clean;
        self.cursor = self.grapheme_count();
        Some(self.change())
    }

    pub fn delete_backward(&mut self) -> Option<TextChange> {
        if self.cursor == 0 {
            return None;
        }
        let start = self.byte_offset(self.cursor - 1);
        let end = self.byte_offset(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
        Some(self.change())
    }

    pub fn delete_forward(&mut self) -> Option<TextChange> {
        if self.cursor >= self.grapheme_count() {
            return None;
        }
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.text.replace_range(start..end, "");
        Some(self.change())
    }

    /// Delete whitespace, then the word, before the cursor.
    pub fn delete_word_backward(&mut self) -> Option<TextChange> {
        if self.cursor == 0 {
            return None;
        }
        let graphemes: Vec<&str> = self.text.graphemes(true).take(self.cursor).collect();
        let mut start = graphemes.len();
        while start > 0 && is_space(graphemes[start - 1]) {
            start -= 1;
        }
        while start > 0 && !is_space(graphemes[start - 1]) {
            start -= 1;
        }
        let from = self.byte_offset(start);
        let to = self.byte_offset(self.cursor);
        self.text.replace_range(from..to, "");
        self.cursor = start;
        Some(self.change())
    }

    pub fn clear(&mut self) -> Option<TextChange> {
        if self.text.is_empty() {
            return None;
        }
        self.text.clear();
        self.cursor = 0;
        Some(self.change())
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.grapheme_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    fn byte_offset(&self, grapheme: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn change(&self) -> TextChange {
        TextChange {
            text: (!self.text.is_empty()).then(|| self.text.clone()),
        }
    }
}

fn is_space(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}
