#![forbid(unsafe_code)]

//! Terminal greeter built on `greet-reactive` and `greet-i18n`.
//!
//! # Role
//! A text field feeds a name into [`view_model::NameViewModel`]; the
//! [`controller::GreetingController`] observes that name and renders the
//! greeting into a [`widgets::Label`]. Data flows one way: input reaches
//! state only through `update_name`, and state reaches the label only
//! through a subscription.
//!
//! # Layout
//! - `view_model`: the state holder (single writer, read-only projection).
//! - `controller`: the binding with its `Uninitialized → Bound → Unbound` lifecycle.
//! - `widgets`: the label and the single-line text field.
//! - `app` / `msg`: key handling and view composition.
//! - `program` / `terminal`: the crossterm event loop and RAII session.
//! - `feed`: a worker thread that types a name through the dispatcher.
//! - `headless`: line-oriented mode for pipes and tests.
//! - `cli` / `logging`: configuration and tracing setup.

pub mod app;
pub mod cli;
pub mod controller;
pub mod error;
pub mod feed;
pub mod headless;
pub mod logging;
pub mod msg;
pub mod program;
pub mod terminal;
pub mod view_model;
pub mod widgets;

pub use app::{Flow, GreetApp};
pub use controller::{ControllerError, ControllerState, GreetingController};
pub use error::AppError;
pub use view_model::{NameUpdater, NameViewModel};
pub use widgets::{DisplayTarget, Label, TextChange, TextField};
