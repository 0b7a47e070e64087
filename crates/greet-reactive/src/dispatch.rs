#![forbid(unsafe_code)]

//! UI-thread dispatch for values produced on other threads.
//!
//! A [`Dispatcher`] lives on the thread that owns the observables (the UI
//! thread). Binding an observable yields a [`Poster`], which is `Send` and
//! can be cloned into worker threads. Posting only enqueues; the value is
//! written and subscribers run when the owning thread calls
//! [`Dispatcher::drain`].
//!
//! # Ordering Rules
//!
//! - Every posted value is delivered. There is no coalescing: posting
//!   `"K"`, `"Ke"`, `"Ken"` produces three notifications.
//! - Delivery is FIFO in channel order. Values posted by one thread are
//!   delivered in the order that thread posted them.
//! - Each delivery runs the full notification cycle before the next value
//!   is taken from the queue.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Target dropped | Observable dropped while values are queued | Value discarded, sink removed |
//! | Dispatcher dropped | Poster outlives the UI thread's dispatcher | `post` returns [`DispatchError::Disconnected`] |
//! | Endless reposting | A subscriber posts on every delivery | `drain` keeps running; bound with [`Dispatcher::drain_at_most`] |

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use crate::observable::MutableObservable;

/// Errors from posting to a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The owning dispatcher has been dropped; the value was not queued.
    #[error("dispatcher disconnected; value was not delivered")]
    Disconnected,
}

/// Identifies one bound observable inside a dispatcher.
type SinkId = u64;

/// A queued value on its way to the UI thread.
struct Envelope {
    sink: SinkId,
    payload: Box<dyn Any + Send>,
}

/// Applies a payload to its target. Returns `false` once the target is gone.
type Sink = Rc<dyn Fn(Box<dyn Any + Send>) -> bool>;

/// FIFO mailbox owned by the UI thread.
///
/// `Dispatcher` is deliberately `!Send`: the sinks it holds reference
/// thread-confined observables.
pub struct Dispatcher {
    tx: mpsc::Sender<Envelope>,
    rx: mpsc::Receiver<Envelope>,
    sinks: RefCell<HashMap<SinkId, Sink>>,
    next_sink: Cell<SinkId>,
    queued: Arc<AtomicUsize>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("bound", &self.sinks.borrow().len())
            .field("queued", &self.queued())
            .finish()
    }
}

impl Dispatcher {
    /// Create a dispatcher on the current thread.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            sinks: RefCell::new(HashMap::new()),
            next_sink: Cell::new(0),
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind an observable and return a thread-safe poster for it.
    ///
    /// The dispatcher keeps only a weak reference to the observable.
    pub fn bind<T>(&self, target: &MutableObservable<T>) -> Poster<T>
    where
        T: Clone + Send + 'static,
    {
        let id = self.next_sink.get();
        self.next_sink.set(id + 1);

        let weak = target.downgrade();
        let sink: Sink = Rc::new(move |payload: Box<dyn Any + Send>| {
            let Some(target) = weak.upgrade() else {
                return false;
            };
            match payload.downcast::<T>() {
                Ok(value) => target.set(*value),
                Err(_) => tracing::warn!(sink = id, "posted payload has unexpected type"),
            }
            true
        });
        self.sinks.borrow_mut().insert(id, sink);
        tracing::debug!(sink = id, "observable bound to dispatcher");

        Poster {
            sink: id,
            tx: self.tx.clone(),
            queued: Arc::clone(&self.queued),
            _marker: PhantomData,
        }
    }

    /// Number of values posted but not yet delivered.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    /// Deliver every queued value, in order. Returns the number delivered.
    pub fn drain(&self) -> usize {
        self.drain_at_most(usize::MAX)
    }

    /// Deliver up to `max` queued values, in order.
    pub fn drain_at_most(&self, max: usize) -> usize {
        let mut delivered = 0;
        while delivered < max {
            let Ok(envelope) = self.rx.try_recv() else {
                break;
            };
            if self.deliver(envelope) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Block up to `timeout` for the first posted value, then drain the rest.
    pub fn wait_and_drain(&self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(envelope) => usize::from(self.deliver(envelope)) + self.drain(),
            Err(_) => 0,
        }
    }

    fn deliver(&self, envelope: Envelope) -> bool {
        self.queued.fetch_sub(1, Ordering::AcqRel);
        // Clone the sink out so callbacks may bind new observables.
        let sink = self.sinks.borrow().get(&envelope.sink).cloned();
        let Some(sink) = sink else {
            tracing::trace!(sink = envelope.sink, "dropping value for unbound sink");
            return false;
        };
        if sink(envelope.payload) {
            tracing::trace!(sink = envelope.sink, "delivered posted value");
            true
        } else {
            tracing::trace!(sink = envelope.sink, "target dropped; removing sink");
            self.sinks.borrow_mut().remove(&envelope.sink);
            false
        }
    }
}

/// Thread-safe handle that posts values to one bound observable.
pub struct Poster<T> {
    sink: SinkId,
    tx: mpsc::Sender<Envelope>,
    queued: Arc<AtomicUsize>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for Poster<T> {
    fn clone(&self) -> Self {
        Self {
            sink: self.sink,
            tx: self.tx.clone(),
            queued: Arc::clone(&self.queued),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Poster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poster").field("sink", &self.sink).finish()
    }
}

impl<T: Send + 'static> Poster<T> {
    /// Queue `value` for delivery on the dispatcher's thread.
    pub fn post(&self, value: T) -> Result<(), DispatchError> {
        self.queued.fetch_add(1, Ordering::AcqRel);
        let envelope = Envelope {
            sink: self.sink,
            payload: Box::new(value),
        };
        self.tx.send(envelope).map_err(|_| {
            self.queued.fetch_sub(1, Ordering::AcqRel);
            DispatchError::Disconnected
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn recorded(target: &MutableObservable<String>) -> (Rc<RefCell<Vec<String>>>, crate::Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let sub = target
            .observable()
            .subscribe(move |v: &String| sink.borrow_mut().push(v.clone()));
        (log, sub)
    }

    #[test]
    fn post_is_deferred_until_drain() {
        let dispatcher = Dispatcher::new();
        let name = MutableObservable::new(String::new());
        let poster = dispatcher.bind(&name);

        poster.post("Ken".to_string()).unwrap();
        assert_eq!(name.get(), "");
        assert_eq!(dispatcher.queued(), 1);

        assert_eq!(dispatcher.drain(), 1);
        assert_eq!(name.get(), "Ken");
        assert_eq!(dispatcher.queued(), 0);
    }

    #[test]
    fn drain_preserves_fifo_without_coalescing() {
        let dispatcher = Dispatcher::new();
        let name = MutableObservable::new(String::new());
        let poster = dispatcher.bind(&name);
        let (log, _sub) = recorded(&name);

        for v in ["K", "Ke", "Ken"] {
            poster.post(v.to_string()).unwrap();
        }
        assert_eq!(dispatcher.drain(), 3);
        assert_eq!(*log.borrow(), vec!["", "K", "Ke", "Ken"]);
    }

    #[test]
    fn drain_at_most_leaves_the_rest_queued() {
        let dispatcher = Dispatcher::new();
        let name = MutableObservable::new(String::new());
        let poster = dispatcher.bind(&name);

        for v in ["a", "b", "c"] {
            poster.post(v.to_string()).unwrap();
        }
        assert_eq!(dispatcher.drain_at_most(2), 2);
        assert_eq!(name.get(), "b");
        assert_eq!(dispatcher.queued(), 1);
        assert_eq!(dispatcher.drain(), 1);
        assert_eq!(name.get(), "c");
    }

    #[test]
    fn posts_from_worker_thread_arrive_in_order() {
        let dispatcher = Dispatcher::new();
        let name = MutableObservable::new(String::new());
        let poster = dispatcher.bind(&name);
        let (log, _sub) = recorded(&name);

        let worker = thread::spawn(move || {
            for n in 0..50 {
                poster.post(format!("v{n}")).unwrap();
            }
        });
        worker.join().unwrap();

        assert_eq!(dispatcher.drain(), 50);
        let seen = log.borrow();
        assert_eq!(seen.len(), 51);
        for (n, value) in seen.iter().skip(1).enumerate() {
            assert_eq!(value, &format!("v{n}"));
        }
    }

    #[test]
    fn wait_and_drain_times_out_when_idle() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.wait_and_drain(Duration::from_millis(5)), 0);
    }

    #[test]
    fn wait_and_drain_picks_up_late_post() {
        let dispatcher = Dispatcher::new();
        let name = MutableObservable::new(String::new());
        let poster = dispatcher.bind(&name);

        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            poster.post("late".to_string()).unwrap();
        });
        assert_eq!(dispatcher.wait_and_drain(Duration::from_secs(5)), 1);
        worker.join().unwrap();
        assert_eq!(name.get(), "late");
    }

    #[test]
    fn dropped_target_discards_queued_values() {
        let dispatcher = Dispatcher::new();
        let name = MutableObservable::new(String::new());
        let poster = dispatcher.bind(&name);
        poster.post("orphan".to_string()).unwrap();
        drop(name);

        assert_eq!(dispatcher.drain(), 0);
        assert_eq!(dispatcher.queued(), 0);
    }

    #[test]
    fn post_after_dispatcher_drop_is_disconnected() {
        let dispatcher = Dispatcher::new();
        let name = MutableObservable::new(0u32);
        let poster = dispatcher.bind(&name);
        drop(dispatcher);

        assert_eq!(poster.post(1), Err(DispatchError::Disconnected));
    }

    #[test]
    fn independent_sinks_share_one_queue() {
        let dispatcher = Dispatcher::new();
        let first = MutableObservable::new(String::new());
        let second = MutableObservable::new(0u32);
        let p1 = dispatcher.bind(&first);
        let p2 = dispatcher.bind(&second);

        p1.post("a".into()).unwrap();
        p2.post(7).unwrap();
        p1.post("b".into()).unwrap();

        assert_eq!(dispatcher.drain(), 3);
        assert_eq!(first.get(), "b");
        assert_eq!(first.version(), 2);
        assert_eq!(second.get(), 7);
    }
}
