#![forbid(unsafe_code)]

//! Observable value with change notification and version tracking.
//!
//! # Design
//!
//! [`MutableObservable<T>`] owns a value of type `T` in shared,
//! reference-counted storage (`Rc<RefCell<..>>`). Every mutation bumps the
//! version and notifies all live subscribers in registration order.
//! Consumers receive an [`Observable<T>`], which shares the same storage but
//! exposes no mutator.
//!
//! # Performance
//!
//! | Operation     | Complexity                 |
//! |---------------|----------------------------|
//! | `get()`       | O(1) + clone               |
//! | `set()`       | O(S) where S = subscribers |
//! | `subscribe()` | O(1) amortized + one call  |
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: calling `set()` or `update()` from within a
//!   subscriber callback queues the change. It is applied and delivered
//!   after the running cycle finishes, so every subscriber still observes
//!   mutations in order.
//! - **Panicking subscriber**: the panic unwinds out of `set()`. Changes
//!   still queued from re-entrant calls in that cycle are discarded, and the
//!   observable accepts new mutations afterwards.
//! - **Touching the observable inside `update()`**: the closure runs while
//!   the value is mutably borrowed; reading the observable from it panics.
//! - **Subscriber leak**: `Subscription` guards stored forever keep their
//!   callbacks alive. Dead weak references are pruned lazily on notify.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// A subscriber callback stored as a strong `Rc` by its [`Subscription`],
/// handed out as `Weak` to the observable.
type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// A mutation waiting for the running notification cycle to finish.
enum Change<T> {
    Set(T),
    Update(Box<dyn FnOnce(&mut T)>),
}

/// Shared interior for both observable handles.
struct ObservableInner<T> {
    value: T,
    version: u64,
    /// Subscribers stored as weak references. Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
    /// True while subscribers are being called.
    notifying: bool,
    /// Mutations issued from inside a callback.
    pending: VecDeque<Change<T>>,
}

impl<T> ObservableInner<T> {
    fn apply(&mut self, change: Change<T>) {
        match change {
            Change::Set(value) => self.value = value,
            Change::Update(f) => f(&mut self.value),
        }
        self.version += 1;
    }
}

/// The writable side of an observable value.
///
/// There is exactly one `MutableObservable` per value: the type is not
/// `Clone`, so whoever owns it is the only writer. Readers get an
/// [`Observable`] via [`observable()`](Self::observable).
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each mutation.
/// 2. Subscribers are notified in registration order.
/// 3. Mutations issued during a notification cycle are delivered after it,
///    in issue order.
pub struct MutableObservable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

/// Read-only projection of a [`MutableObservable`].
///
/// Cloning an `Observable` creates a new handle to the **same** inner state.
/// It can read and subscribe, never write.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

/// Non-owning handle used by the dispatcher so that posted values for a
/// dropped observable are discarded instead of keeping it alive.
pub(crate) struct WeakMutable<T> {
    inner: Weak<RefCell<ObservableInner<T>>>,
}

impl<T> WeakMutable<T> {
    pub(crate) fn upgrade(&self) -> Option<MutableObservable<T>> {
        self.inner
            .upgrade()
            .map(|inner| MutableObservable { inner })
    }
}

// Manual Clone: shares the same Rc.
impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for MutableObservable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("MutableObservable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + Default + 'static> Default for MutableObservable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + 'static> MutableObservable<T> {
    /// Create a new observable with the given initial value.
    ///
    /// The initial version is 0 and no subscribers are registered.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
                notifying: false,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Hand out a read-only view of this value.
    #[must_use]
    pub fn observable(&self) -> Observable<T> {
        Observable {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Current version number.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value unconditionally and notify every live subscriber.
    pub fn set(&self, value: T) {
        self.apply(Change::Set(value));
    }

    /// Modify the value in place via a closure, then notify.
    ///
    /// # Panics
    ///
    /// Panics if `f` reads or writes this observable.
    pub fn update(&self, f: impl FnOnce(&mut T) + 'static) {
        self.apply(Change::Update(Box::new(f)));
    }

    pub(crate) fn downgrade(&self) -> WeakMutable<T> {
        WeakMutable {
            inner: Rc::downgrade(&self.inner),
        }
    }

    fn apply(&self, change: Change<T>) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.notifying {
                inner.pending.push_back(change);
                return;
            }
            inner.notifying = true;
            inner.apply(change);
        }

        let _cycle = CycleGuard { inner: &self.inner };
        loop {
            notify(&self.inner);
            let mut inner = self.inner.borrow_mut();
            match inner.pending.pop_front() {
                Some(next) => inner.apply(next),
                None => break,
            }
        }
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Current version number. Increments by 1 on each mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered subscribers (including dead ones not yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Subscribe to the value.
    ///
    /// The callback is invoked once right away with the current value and
    /// again after every mutation, until the returned [`Subscription`] is
    /// dropped or cancelled.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.push(Rc::downgrade(&strong));
            inner.value.clone()
        };
        strong(&current);
        Subscription {
            _guard: Box::new(strong),
        }
    }
}

/// Clears the cycle flag even if a subscriber panics.
struct CycleGuard<'a, T> {
    inner: &'a RefCell<ObservableInner<T>>,
}

impl<T> Drop for CycleGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.notifying = false;
            inner.pending.clear();
        }
    }
}

/// Notify live subscribers and prune dead ones.
fn notify<T: Clone>(cell: &RefCell<ObservableInner<T>>) {
    // Snapshot under the borrow, call outside of it.
    let (value, subscribers) = {
        let mut inner = cell.borrow_mut();
        inner.subscribers.retain(|w| w.strong_count() > 0);
        (inner.value.clone(), inner.subscribers.clone())
    };

    // Upgrade lazily: a callback may cancel a later subscription mid-cycle.
    for weak in &subscribers {
        if let Some(cb) = weak.upgrade() {
            cb(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the only strong reference to the
/// callback, so the `Weak` kept by the observable can no longer be upgraded.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    /// Type-erased strong reference keeping the callback `Rc` alive.
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    /// Unsubscribe explicitly. Equivalent to dropping the guard.
    pub fn cancel(self) {}
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
