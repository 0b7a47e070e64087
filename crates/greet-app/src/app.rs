//! The greeter model: text field, label, controller, and key handling.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use greet_i18n::Template;
use greet_reactive::Dispatcher;

use crate::controller::{ControllerError, GreetingController};
use crate::msg::Msg;
use crate::view_model::{NameUpdater, NameViewModel};
use crate::widgets::{DisplayTarget, Label, TextChange, TextField};

const TITLE: &str = "greet";
const PROMPT: &str = "Name: ";
const HINT: &str = "Type a name. Esc or Ctrl+C quits.";

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything the terminal shows, plus the binding that drives the label.
pub struct GreetApp {
    // Declared first so the controller unbinds before the rest is dropped.
    controller: GreetingController<Label>,
    view_model: Rc<NameViewModel>,
    dispatcher: Dispatcher,
    field: TextField,
    label: Rc<RefCell<Label>>,
    size: (u16, u16),
    dirty: bool,
}

impl std::fmt::Debug for GreetApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreetApp")
            .field("controller", &self.controller)
            .field("field", &self.field)
            .field("greeting", &self.greeting())
            .finish_non_exhaustive()
    }
}

impl GreetApp {
    /// Build the widgets and bind the controller.
    pub fn new(template: Template) -> Result<Self, ControllerError> {
        let dispatcher = Dispatcher::new();
        let view_model = Rc::new(NameViewModel::new(&dispatcher));
        let label = Rc::new(RefCell::new(Label::new()));
        let mut controller = GreetingController::new(Rc::clone(&view_model), template, &label);
        controller.bind()?;

        Ok(Self {
            controller,
            view_model,
            dispatcher,
            field: TextField::new(),
            label,
            size: (80, 24),
            dirty: true,
        })
    }

    /// Apply one message. Pending name updates are delivered before returning.
    pub fn handle(&mut self, msg: Msg) -> Flow {
        let flow = match msg {
            Msg::Key(key) => self.handle_key(key),
            Msg::Paste(text) => {
                let change = self.field.insert_text(&text);
                self.forward(change);
                Flow::Continue
            }
            Msg::Resize { width, height } => {
                self.size = (width, height);
                self.dirty = true;
                Flow::Continue
            }
            Msg::Tick | Msg::Noop => Flow::Continue,
        };
        self.pump();
        flow
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind == KeyEventKind::Release {
            return Flow::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        let change = match key.code {
            KeyCode::Esc => return Flow::Quit,
            KeyCode::Char('c') if ctrl => return Flow::Quit,
            KeyCode::Char('a') if ctrl => {
                self.field.move_home();
                None
            }
            KeyCode::Char('e') if ctrl => {
                self.field.move_end();
                None
            }
            KeyCode::Char('u') if ctrl => self.field.clear(),
            KeyCode::Char('w') if ctrl => self.field.delete_word_backward(),
            KeyCode::Char(_) if ctrl || alt => None,
            KeyCode::Char(ch) => self.field.insert_char(ch),
            KeyCode::Backspace if ctrl || alt => self.field.delete_word_backward(),
            KeyCode::Backspace => self.field.delete_backward(),
            KeyCode::Delete => self.field.delete_forward(),
            KeyCode::Left => {
                self.field.move_left();
                None
            }
            KeyCode::Right => {
                self.field.move_right();
                None
            }
            KeyCode::Home => {
                self.field.move_home();
                None
            }
            KeyCode::End => {
                self.field.move_end();
                None
            }
            _ => None,
        };
        // Cursor moves still need a redraw.
        self.dirty = true;
        self.forward(change);
        Flow::Continue
    }

    /// Replace the field content, as if the user had retyped it.
    pub fn replace_text(&mut self, text: &str) {
        let change = self.field.set_text(text);
        self.forward(change);
        self.pump();
    }

    /// Forward one input-change event verbatim, bypassing the text field.
    ///
    /// Unlike [`replace_text`](Self::replace_text), control characters are
    /// kept and a repeat of the current text is still forwarded.
    pub fn text_changed(&mut self, text: &str) {
        self.controller.on_text_changed(Some(text));
        self.pump();
    }

    fn forward(&mut self, change: Option<TextChange>) {
        if let Some(change) = change {
            self.controller.on_text_changed(change.text.as_deref());
        }
    }

    /// Deliver queued name updates. Returns how many were delivered.
    pub fn pump(&mut self) -> usize {
        let delivered = self.dispatcher.drain();
        if delivered > 0 {
            self.dirty = true;
        }
        delivered
    }

    /// Block up to `timeout` for a posted update, then deliver everything queued.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        let delivered = self.dispatcher.wait_and_drain(timeout);
        if delivered > 0 {
            self.dirty = true;
        }
        delivered
    }

    /// A handle other threads can use to change the name.
    #[must_use]
    pub fn updater(&self) -> NameUpdater {
        self.view_model.updater()
    }

    #[must_use]
    pub fn greeting(&self) -> String {
        self.label.borrow().text().to_string()
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.view_model.current()
    }

    /// Number of name mutations delivered so far.
    #[must_use]
    pub fn name_version(&self) -> u64 {
        self.view_model.name().version()
    }

    #[must_use]
    pub fn field(&self) -> &TextField {
        &self.field
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Returns whether a redraw is needed, and resets the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Lines to draw, top to bottom.
    #[must_use]
    pub fn view_lines(&self) -> Vec<String> {
        vec![
            TITLE.to_string(),
            String::new(),
            format!("{PROMPT}{}", self.field.text()),
            String::new(),
            self.greeting(),
            String::new(),
            HINT.to_string(),
        ]
    }

    /// Terminal cell where the caret belongs.
    #[must_use]
    pub fn cursor_position(&self) -> (u16, u16) {
        let column = PROMPT.len() + self.field.cursor_column();
        (u16::try_from(column).unwrap_or(u16::MAX), 2)
    }

    /// Tear down the binding. Later updates no longer reach the label.
    pub fn shutdown(&mut self) {
        if let Err(err) = self.controller.unbind() {
            tracing::debug!(%err, "shutdown on an already unbound controller");
        }
    }
}
