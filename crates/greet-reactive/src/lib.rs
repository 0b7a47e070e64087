#![forbid(unsafe_code)]

//! Reactive data bindings for greet.
//!
//! This crate provides the change-propagation primitives behind the
//! name-to-greeting binding:
//!
//! - [`MutableObservable`]: the single-writer value slot with version
//!   tracking and subscriber notification.
//! - [`Observable`]: the read-only projection handed to consumers.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`Dispatcher`] / [`Poster`]: a FIFO mailbox that marshals values posted
//!   from any thread onto the thread that owns the observables.
//!
//! # Architecture
//!
//! Observables use `Rc<RefCell<..>>` and are therefore confined to one
//! thread. Other threads only ever hold a [`Poster`], which is `Send` and
//! can do nothing but enqueue a value. Delivery happens inside
//! [`Dispatcher::drain`] on the owning thread, so subscriber callbacks never
//! run concurrently with each other or with the owning thread's handlers.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation. Every mutation notifies,
//!    including one that stores an equal value.
//! 2. Subscribers are notified in registration order.
//! 3. A new subscriber is invoked immediately with the current value.
//! 4. Dropping a [`Subscription`] stops delivery at once, even mid-cycle.
//! 5. Posted values are delivered in FIFO order without coalescing.

pub mod dispatch;
pub mod observable;

pub use dispatch::{DispatchError, Dispatcher, Poster};
pub use observable::{MutableObservable, Observable, Subscription};
