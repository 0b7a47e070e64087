//! Binds text-field changes to the name and the name to a greeting label.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──bind()──▶ Bound ──unbind()/drop──▶ Unbound
//!       └─────────────unbind()/drop──────────────────────▲
//! ```
//!
//! `Unbound` is terminal. Leaving `Bound` drops the subscription, so no
//! notification reaches the display afterwards. The subscription callback
//! holds the display weakly: a display dropped before the controller is
//! never written to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use greet_i18n::{EMPTY_NAME, Template};
use greet_reactive::Subscription;

use crate::view_model::NameViewModel;
use crate::widgets::DisplayTarget;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Bound,
    Unbound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("cannot {action} a controller that is {from:?}")]
    InvalidTransition {
        from: ControllerState,
        action: &'static str,
    },
}

/// Renders `template` with the current name into a display target.
pub struct GreetingController<D: DisplayTarget + 'static> {
    view_model: Rc<NameViewModel>,
    template: Template,
    display: Weak<RefCell<D>>,
    state: ControllerState,
    subscription: Option<Subscription>,
}

impl<D: DisplayTarget + 'static> std::fmt::Debug for GreetingController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreetingController")
            .field("template", &self.template.source())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<D: DisplayTarget + 'static> GreetingController<D> {
    /// Create an unbound controller. Nothing is rendered until [`bind`](Self::bind).
    #[must_use]
    pub fn new(view_model: Rc<NameViewModel>, template: Template, display: &Rc<RefCell<D>>) -> Self {
        Self {
            view_model,
            template,
            display: Rc::downgrade(display),
            state: ControllerState::Uninitialized,
            subscription: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Render the empty-name greeting, then follow the name.
    pub fn bind(&mut self) -> Result<(), ControllerError> {
        if self.state != ControllerState::Uninitialized {
            return Err(ControllerError::InvalidTransition {
                from: self.state,
                action: "bind",
            });
        }

        render(&self.display, &self.template, EMPTY_NAME);

        let display = self.display.clone();
        let template = self.template.clone();
        let subscription = self
            .view_model
            .name()
            .subscribe(move |name: &String| render(&display, &template, name));

        self.subscription = Some(subscription);
        self.state = ControllerState::Bound;
        tracing::debug!(template = self.template.source(), "controller bound");
        Ok(())
    }

    /// Forward an input change. A missing payload counts as the empty name.
    pub fn on_text_changed(&self, text: Option<&str>) {
        if self.state != ControllerState::Bound {
            tracing::debug!(state = ?self.state, "ignoring input change on inactive controller");
            return;
        }
        self.view_model.update_name(text.unwrap_or(EMPTY_NAME));
    }

    /// Release the subscription. Allowed once, from any non-terminal state.
    pub fn unbind(&mut self) -> Result<(), ControllerError> {
        if self.state == ControllerState::Unbound {
            return Err(ControllerError::InvalidTransition {
                from: self.state,
                action: "unbind",
            });
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
        tracing::debug!(from = ?self.state, "controller unbound");
        self.state = ControllerState::Unbound;
        Ok(())
    }
}

impl<D: DisplayTarget + 'static> Drop for GreetingController<D> {
    fn drop(&mut self) {
        if self.state != ControllerState::Unbound {
            let _ = self.unbind();
        }
    }
}

fn render<D: DisplayTarget>(display: &Weak<RefCell<D>>, template: &Template, name: &str) {
    match display.upgrade() {
        Some(target) => target.borrow_mut().set_text(template.render(name)),
        None => tracing::trace!("display target gone; skipping render"),
    }
}
