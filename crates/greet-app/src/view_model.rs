//! The name state holder.
//!
//! [`NameViewModel`] owns the only [`MutableObservable`] for the name and
//! publishes it as a read-only [`Observable`]. Updates are always posted
//! through the dispatcher, from the UI thread and from workers alike, so
//! every update reaches observers on the UI thread in the order it was made.

use greet_reactive::{Dispatcher, MutableObservable, Observable, Poster};

/// Holds the current name. Starts empty.
pub struct NameViewModel {
    name: MutableObservable<String>,
    poster: Poster<String>,
}

impl std::fmt::Debug for NameViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameViewModel")
            .field("name", &self.name.get())
            .field("version", &self.name.version())
            .finish()
    }
}

impl NameViewModel {
    /// Create the holder and bind it to the UI thread's dispatcher.
    #[must_use]
    pub fn new(dispatcher: &Dispatcher) -> Self {
        let name = MutableObservable::new(String::new());
        let poster = dispatcher.bind(&name);
        Self { name, poster }
    }

    /// Replace the name. Any string is accepted, including `""`.
    ///
    /// Delivery to observers happens on the next dispatcher drain.
    pub fn update_name(&self, new_name: impl Into<String>) {
        post(&self.poster, new_name.into());
    }

    /// Read-only view of the name for observers.
    #[must_use]
    pub fn name(&self) -> Observable<String> {
        self.name.observable()
    }

    /// The last delivered name.
    #[must_use]
    pub fn current(&self) -> String {
        self.name.get()
    }

    /// A `Send` handle for updating the name from another thread.
    #[must_use]
    pub fn updater(&self) -> NameUpdater {
        NameUpdater {
            poster: self.poster.clone(),
        }
    }
}

/// Thread-safe writer for the name. It can update, never read.
#[derive(Debug, Clone)]
pub struct NameUpdater {
    poster: Poster<String>,
}

impl NameUpdater {
    /// Same contract as [`NameViewModel::update_name`].
    pub fn update_name(&self, new_name: impl Into<String>) {
        post(&self.poster, new_name.into());
    }
}

fn post(poster: &Poster<String>, name: String) {
    let len = name.len();
    match poster.post(name) {
        Ok(()) => tracing::trace!(len, "name update posted"),
        Err(err) => tracing::warn!(%err, "name update dropped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;

    #[test]
    fn starts_empty() {
        let dispatcher = Dispatcher::new();
        let vm = NameViewModel::new(&dispatcher);
        assert_eq!(vm.current(), "");
        assert_eq!(vm.name().version(), 0);
    }

    #[test]
    fn update_is_delivered_on_drain() {
        let dispatcher = Dispatcher::new();
        let vm = NameViewModel::new(&dispatcher);

        vm.update_name("Ken");
        assert_eq!(vm.current(), "");
        dispatcher.drain();
        assert_eq!(vm.current(), "Ken");
    }

    #[test]
    fn observer_sees_initial_then_updates() {
        let dispatcher = Dispatcher::new();
        let vm = NameViewModel::new(&dispatcher);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = vm
            .name()
            .subscribe(move |n: &String| sink.borrow_mut().push(n.clone()));

        vm.update_name("K");
        vm.update_name("");
        vm.update_name("Ken");
        dispatcher.drain();

        assert_eq!(*seen.borrow(), vec!["", "K", "", "Ken"]);
    }

    #[test]
    fn updater_works_across_threads() {
        let dispatcher = Dispatcher::new();
        let vm = NameViewModel::new(&dispatcher);
        let updater = vm.updater();

        thread::spawn(move || updater.update_name("from worker"))
            .join()
            .unwrap();
        dispatcher.drain();
        assert_eq!(vm.current(), "from worker");
    }

    #[test]
    fn update_after_dispatcher_drop_is_ignored() {
        let dispatcher = Dispatcher::new();
        let vm = NameViewModel::new(&dispatcher);
        drop(dispatcher);

        vm.update_name("lost");
        assert_eq!(vm.current(), "");
    }

    #[test]
    fn updater_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<NameUpdater>();
    }
}
