//! The terminal event loop.
//!
//! Each iteration waits up to one tick for terminal input, turns it into a
//! [`Msg`], and hands it to the app. The app drains the dispatcher after
//! every message, so updates posted by worker threads are delivered on this
//! thread between input events, never concurrently with them.

use std::io;
use std::time::Duration;

use crossterm::event;

use crate::app::{Flow, GreetApp};
use crate::error::AppError;
use crate::feed::{FeedConfig, FeedHandle};
use crate::msg::Msg;
use crate::terminal::TerminalSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramConfig {
    /// How long to wait for input before an idle tick.
    pub tick: Duration,
    /// Optional background typist.
    pub feed: Option<FeedConfig>,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            feed: None,
        }
    }
}

/// Something the event loop can draw into.
///
/// [`TerminalSession`] is the real one; tests use an in-memory recorder.
pub trait Screen {
    /// Current size as `(columns, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Replace the whole screen and place the caret.
    fn draw(&mut self, lines: &[String], caret: (u16, u16)) -> io::Result<()>;
}

impl Screen for TerminalSession {
    fn size(&self) -> io::Result<(u16, u16)> {
        TerminalSession::size(self)
    }

    fn draw(&mut self, lines: &[String], caret: (u16, u16)) -> io::Result<()> {
        TerminalSession::draw(self, lines, caret)
    }
}

/// Run the app in the terminal until the user quits.
pub fn run(mut app: GreetApp, config: ProgramConfig) -> Result<(), AppError> {
    let mut session = TerminalSession::enter()?;
    let (width, height) = session.size()?;
    app.handle(Msg::Resize { width, height });

    let feed = config
        .feed
        .map(|feed| FeedHandle::spawn(app.updater(), feed))
        .transpose()?;

    let result = event_loop(&mut app, &mut session, config.tick, poll_terminal);

    if let Some(feed) = feed {
        let posted = feed.finish();
        tracing::debug!(posted, "feed stopped");
    }
    app.shutdown();
    drop(session);
    result
}

/// Wait up to `tick` for terminal input; an idle wait becomes [`Msg::Tick`].
fn poll_terminal(tick: Duration) -> io::Result<Msg> {
    if event::poll(tick)? {
        Ok(Msg::from(event::read()?))
    } else {
        Ok(Msg::Tick)
    }
}

/// Redraw when the app is dirty, then hand it the next message, until it
/// asks to quit.
pub fn event_loop<S, F>(
    app: &mut GreetApp,
    screen: &mut S,
    tick: Duration,
    mut next_msg: F,
) -> Result<(), AppError>
where
    S: Screen,
    F: FnMut(Duration) -> io::Result<Msg>,
{
    loop {
        if app.take_dirty() {
            screen.draw(&app.view_lines(), app.cursor_position())?;
        }

        let msg = next_msg(tick)?;
        if app.handle(msg) == Flow::Quit {
            tracing::debug!("quit requested");
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use greet_i18n::Template;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct RecordingScreen {
        frames: Vec<(Vec<String>, (u16, u16))>,
    }

    impl Screen for RecordingScreen {
        fn size(&self) -> io::Result<(u16, u16)> {
            Ok((80, 24))
        }

        fn draw(&mut self, lines: &[String], caret: (u16, u16)) -> io::Result<()> {
            self.frames.push((lines.to_vec(), caret));
            Ok(())
        }
    }

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn script(msgs: Vec<Msg>) -> impl FnMut(Duration) -> io::Result<Msg> {
        let mut msgs = VecDeque::from(msgs);
        move |_| Ok(msgs.pop_front().unwrap_or(key(KeyCode::Esc)))
    }

    fn app() -> GreetApp {
        GreetApp::new(Template::parse("Hello, %s!").unwrap()).unwrap()
    }

    fn greeting_of(frame: &(Vec<String>, (u16, u16))) -> &str {
        &frame.0[4]
    }

    #[test]
    fn draws_initial_frame_then_each_change() {
        let mut app = app();
        let mut screen = RecordingScreen::default();
        let msgs = vec![
            key(KeyCode::Char('K')),
            key(KeyCode::Char('e')),
            key(KeyCode::Char('n')),
        ];
        event_loop(&mut app, &mut screen, Duration::ZERO, script(msgs)).unwrap();

        let greetings: Vec<&str> = screen.frames.iter().map(greeting_of).collect();
        assert_eq!(greetings, ["Hello, !", "Hello, K!", "Hello, Ke!", "Hello, Ken!"]);
        assert_eq!(screen.frames[3].1, (9, 2));
    }

    #[test]
    fn idle_ticks_do_not_redraw() {
        let mut app = app();
        let mut screen = RecordingScreen::default();
        let msgs = vec![Msg::Tick, Msg::Tick, Msg::Noop];
        event_loop(&mut app, &mut screen, Duration::ZERO, script(msgs)).unwrap();
        assert_eq!(screen.frames.len(), 1);
    }

    #[test]
    fn worker_update_is_drawn_on_next_tick() {
        let mut app = app();
        let updater = app.updater();
        let mut screen = RecordingScreen::default();
        let mut posted = false;
        let next = move |_: Duration| -> io::Result<Msg> {
            if posted {
                return Ok(key(KeyCode::Esc));
            }
            posted = true;
            updater.update_name("Ken");
            Ok(Msg::Tick)
        };
        event_loop(&mut app, &mut screen, Duration::ZERO, next).unwrap();

        let greetings: Vec<&str> = screen.frames.iter().map(greeting_of).collect();
        assert_eq!(greetings, ["Hello, !", "Hello, Ken!"]);
    }

    #[test]
    fn input_errors_end_the_loop() {
        let mut app = app();
        let mut screen = RecordingScreen::default();
        let result = event_loop(&mut app, &mut screen, Duration::ZERO, |_| {
            Err(io::Error::other("tty gone"))
        });
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
