//! End-to-end greeting flow: input → state holder → dispatcher → controller → label.

use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use greet_app::feed::{FeedConfig, FeedHandle};
use greet_app::msg::Msg;
use greet_app::{
    ControllerState, DisplayTarget, GreetApp, GreetingController, NameViewModel, headless,
};
use greet_i18n::{GREETING_MESSAGE, StringCatalog, Template};
use greet_reactive::Dispatcher;
use tracing::Level;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

fn hello() -> Template {
    Template::parse("Hello, %s!").unwrap()
}

fn key(ch: char) -> Msg {
    Msg::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
}

/// Display that keeps every text it was given.
#[derive(Default)]
struct Recorder {
    current: String,
    history: Vec<String>,
}

impl DisplayTarget for Recorder {
    fn set_text(&mut self, text: String) {
        self.history.push(text.clone());
        self.current = text;
    }

    fn text(&self) -> &str {
        &self.current
    }
}

fn distinct_in_order(history: &[String]) -> Vec<String> {
    let mut out = history.to_vec();
    out.dedup();
    out
}

#[test]
fn typing_ken_renders_each_prefix() {
    init_tracing();
    let mut app = GreetApp::new(hello()).unwrap();
    assert_eq!(app.greeting(), "Hello, !");

    let mut seen = vec![app.greeting()];
    for ch in "Ken".chars() {
        app.handle(key(ch));
        seen.push(app.greeting());
    }
    assert_eq!(seen, ["Hello, !", "Hello, K!", "Hello, Ke!", "Hello, Ken!"]);
    assert_eq!(app.name(), "Ken");
}

#[test]
fn controller_renders_every_update_in_order() {
    init_tracing();
    let dispatcher = Dispatcher::new();
    let vm = Rc::new(NameViewModel::new(&dispatcher));
    let display = Rc::new(RefCell::new(Recorder::default()));
    let mut controller = GreetingController::new(Rc::clone(&vm), hello(), &display);
    controller.bind().unwrap();

    controller.on_text_changed(Some("K"));
    controller.on_text_changed(Some("Ke"));
    controller.on_text_changed(Some("Ken"));
    assert_eq!(dispatcher.drain(), 3);

    assert_eq!(
        distinct_in_order(&display.borrow().history),
        ["Hello, !", "Hello, K!", "Hello, Ke!", "Hello, Ken!"]
    );
}

#[test]
fn repeated_names_are_not_coalesced() {
    let dispatcher = Dispatcher::new();
    let vm = Rc::new(NameViewModel::new(&dispatcher));
    let display = Rc::new(RefCell::new(Recorder::default()));
    let mut controller = GreetingController::new(Rc::clone(&vm), hello(), &display);
    controller.bind().unwrap();
    let before = display.borrow().history.len();

    controller.on_text_changed(Some("Ken"));
    controller.on_text_changed(Some("Ken"));
    dispatcher.drain();

    let history = &display.borrow().history;
    assert_eq!(&history[before..], ["Hello, Ken!", "Hello, Ken!"]);
}

#[test]
fn cleared_field_renders_empty_greeting() {
    let dispatcher = Dispatcher::new();
    let vm = Rc::new(NameViewModel::new(&dispatcher));
    let display = Rc::new(RefCell::new(Recorder::default()));
    let mut controller = GreetingController::new(Rc::clone(&vm), hello(), &display);
    controller.bind().unwrap();

    controller.on_text_changed(Some("Ken"));
    controller.on_text_changed(None);
    dispatcher.drain();

    assert_eq!(display.borrow().text(), "Hello, !");
    assert_eq!(vm.current(), "");
}

#[test]
fn worker_thread_updates_arrive_in_order() {
    init_tracing();
    let mut app = GreetApp::new(hello()).unwrap();
    let updater = app.updater();

    let worker = thread::spawn(move || {
        for name in ["K", "Ke", "Ken"] {
            updater.update_name(name);
        }
    });
    worker.join().unwrap();

    // Nothing is delivered until the UI thread drains.
    assert_eq!(app.greeting(), "Hello, !");
    assert_eq!(app.pump(), 3);
    assert_eq!(app.greeting(), "Hello, Ken!");
}

#[test]
fn wait_picks_up_a_late_post() {
    let mut app = GreetApp::new(hello()).unwrap();
    let updater = app.updater();

    let worker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        updater.update_name("Ken");
    });

    let mut delivered = 0;
    for _ in 0..100 {
        delivered += app.wait(Duration::from_millis(50));
        if delivered > 0 {
            break;
        }
    }
    worker.join().unwrap();
    assert_eq!(delivered, 1);
    assert_eq!(app.greeting(), "Hello, Ken!");
}

#[test]
fn feed_types_through_the_app() {
    init_tracing();
    let mut app = GreetApp::new(hello()).unwrap();
    let feed = FeedHandle::spawn(
        app.updater(),
        FeedConfig {
            text: "Ken".into(),
            interval: Duration::ZERO,
        },
    )
    .unwrap();
    assert_eq!(feed.join(), 3);

    app.handle(Msg::Tick);
    assert_eq!(app.greeting(), "Hello, Ken!");
}

#[test]
fn unbound_controller_ignores_later_updates() {
    let dispatcher = Dispatcher::new();
    let vm = Rc::new(NameViewModel::new(&dispatcher));
    let display = Rc::new(RefCell::new(Recorder::default()));
    let mut controller = GreetingController::new(Rc::clone(&vm), hello(), &display);
    controller.bind().unwrap();
    controller.on_text_changed(Some("K"));
    dispatcher.drain();

    controller.unbind().unwrap();
    assert_eq!(controller.state(), ControllerState::Unbound);

    let updater = vm.updater();
    updater.update_name("Ken");
    dispatcher.drain();

    assert_eq!(vm.current(), "Ken");
    assert_eq!(display.borrow().text(), "Hello, K!");
    assert_eq!(vm.name().subscriber_count(), 0);
}

#[test]
fn app_shutdown_detaches_label() {
    let mut app = GreetApp::new(hello()).unwrap();
    app.handle(key('K'));
    app.shutdown();

    app.updater().update_name("Ken");
    app.pump();
    assert_eq!(app.name(), "Ken");
    assert_eq!(app.greeting(), "Hello, K!");
}

#[test]
fn headless_prints_one_greeting_per_line() {
    init_tracing();
    let mut out = Vec::new();
    let lines = headless::run(hello(), Cursor::new("K\nKe\nKen\n"), &mut out).unwrap();
    assert_eq!(lines, 3);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Hello, !\nHello, K!\nHello, Ke!\nHello, Ken!\n"
    );
}

#[test]
fn localized_template_from_catalog() {
    let catalog = StringCatalog::builtin();
    let template = catalog.template("de-AT", GREETING_MESSAGE).unwrap();
    let mut app = GreetApp::new(template.clone()).unwrap();
    app.replace_text("Ken");
    assert_eq!(app.greeting(), template.render("Ken"));
}
