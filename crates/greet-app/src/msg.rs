use crossterm::event::{Event, KeyEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    Key(KeyEvent),
    Paste(String),
    Resize { width: u16, height: u16 },
    /// Idle tick: no terminal input arrived within the poll interval.
    Tick,
    Noop,
}

impl From<Event> for Msg {
    fn from(event: Event) -> Self {
        match event {
            Event::Key(key) => Msg::Key(key),
            Event::Paste(text) => Msg::Paste(text),
            Event::Resize(width, height) => Msg::Resize { width, height },
            _ => Msg::Noop,
        }
    }
}
