use std::{
    error::Error,
    fmt,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use tokio::runtime;
use tracing::{debug, trace, warn};

use crate::{observer::Observer, ErrorValue};

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by an observable stream.
pub trait Subscribeable {
    /// The type of items emitted by the observable stream.
    type ObsType;

    /// Subscribes to the observable stream and specifies how to handle emitted values.
    ///
    /// Every call starts an independent execution of the stream against a fresh
    /// [`Subscriber`] built from `handlers`. Nothing is shared between two
    /// subscriptions of the same stream.
    ///
    /// The returned `Subscription` can be used to cancel the subscription at any
    /// time.
    fn subscribe(&self, handlers: Handlers<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, allowing the clean release of resources
/// associated with a subscription.
pub trait Unsubscribeable {
    /// Cancels the subscription.
    ///
    /// No handler is invoked after this call returns, and the teardown registered
    /// by the producer runs once. Calling it again, or after the stream already
    /// completed or errored, does nothing.
    ///
    /// Unsubscribing is a silent cancellation: neither the `complete` nor the
    /// `error` handler is called.
    fn unsubscribe(&self);
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(ErrorValue) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// The set of callbacks a consumer passes to `subscribe`.
///
/// Every handler is optional. A missing handler means the corresponding signal
/// is dropped for that subscription; it does not change when the subscription
/// terminates.
///
/// ```
/// use rxcore::{subscribe::Handlers, Observable, Subscribeable};
///
/// let observable = Observable::from([1, 2, 3]);
///
/// observable.subscribe(
///     Handlers::new()
///         .on_next(|v: i32| println!("Emitted {}", v))
///         .on_complete(|| println!("Completed")),
/// );
/// ```
pub struct Handlers<T> {
    next_fn: Option<NextFn<T>>,
    error_fn: Option<ErrorFn>,
    complete_fn: Option<CompleteFn>,
}

impl<T> Handlers<T> {
    /// Creates an empty handler set. Subscribing with it never fails, it simply
    /// ignores every signal.
    #[must_use]
    pub fn new() -> Self {
        Handlers {
            next_fn: None,
            error_fn: None,
            complete_fn: None,
        }
    }

    /// Creates a handler set with all three handlers present.
    pub fn all(
        next_fn: impl FnMut(T) + Send + 'static,
        error_fn: impl FnMut(ErrorValue) + Send + 'static,
        complete_fn: impl FnMut() + Send + 'static,
    ) -> Self {
        Handlers {
            next_fn: Some(Box::new(next_fn)),
            error_fn: Some(Box::new(error_fn)),
            complete_fn: Some(Box::new(complete_fn)),
        }
    }

    /// Sets the function called for every emitted value.
    #[must_use]
    pub fn on_next(mut self, next_fn: impl FnMut(T) + Send + 'static) -> Self {
        self.next_fn = Some(Box::new(next_fn));
        self
    }

    /// Sets the function called once if the stream fails.
    #[must_use]
    pub fn on_error(mut self, error_fn: impl FnMut(ErrorValue) + Send + 'static) -> Self {
        self.error_fn = Some(Box::new(error_fn));
        self
    }

    /// Sets the function called once when the stream completes.
    #[must_use]
    pub fn on_complete(mut self, complete_fn: impl FnMut() + Send + 'static) -> Self {
        self.complete_fn = Some(Box::new(complete_fn));
        self
    }
}

impl<T> Default for Handlers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Handlers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("next", &self.next_fn.is_some())
            .field("error", &self.error_fn.is_some())
            .field("complete", &self.complete_fn.is_some())
            .finish()
    }
}

/// Cleanup returned by a producer, run once when its subscription ends.
///
/// A subscription ends when the producer signals `error` or `complete`, or when
/// the consumer unsubscribes, whichever happens first.
pub enum Teardown {
    /// No cleanup needed.
    Nil,

    /// Cleanup defined by a function.
    Logic(Box<dyn FnOnce() + Send>),

    /// If one subscription depends on another. Wrapped subscription's unsubscribe
    /// will be called upon teardown.
    Wrapped(Subscription),

    /// Asynchronous cleanup represented by a future. It is spawned on the `Tokio`
    /// runtime that was current when the subscription was created.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

impl Teardown {
    pub fn logic(f: impl FnOnce() + Send + 'static) -> Self {
        Teardown::Logic(Box::new(f))
    }

    pub fn future(f: impl Future<Output = ()> + Send + 'static) -> Self {
        Teardown::Future(Box::pin(f))
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Teardown::Nil)
    }

    fn run(self, id: u64, runtime_handle: Option<&runtime::Handle>) {
        match self {
            Teardown::Nil => (),
            Teardown::Logic(fnc) => fnc(),
            Teardown::Wrapped(subscription) => subscription.unsubscribe(),
            Teardown::Future(future) => match runtime_handle {
                Some(handle) => {
                    handle.spawn(future);
                }
                None => {
                    warn!(
                        subscription = id,
                        "asynchronous teardown dropped, subscription was created outside of a Tokio runtime"
                    );
                }
            },
        }
    }
}

impl Default for Teardown {
    fn default() -> Self {
        Teardown::Nil
    }
}

impl From<Subscription> for Teardown {
    fn from(subscription: Subscription) -> Self {
        Teardown::Wrapped(subscription)
    }
}

impl fmt::Debug for Teardown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Teardown::Nil => f.write_str("Teardown::Nil"),
            Teardown::Logic(_) => f.write_str("Teardown::Logic(..)"),
            Teardown::Wrapped(s) => f.debug_tuple("Teardown::Wrapped").field(s).finish(),
            Teardown::Future(_) => f.write_str("Teardown::Future(..)"),
        }
    }
}

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Active,
    // A terminal handler is running. Signals are already ignored but the
    // teardown waits until the handler returns.
    Terminating,
    Closed,
}

struct GateState {
    lifecycle: Lifecycle,
    teardown: Option<Teardown>,
}

// Per-subscription state shared by the `Subscriber` and every `Subscription`
// handle pointing at it. All lifecycle changes happen under the lock; handlers
// and teardowns run outside of it so they may unsubscribe re-entrantly.
struct Gate {
    id: u64,
    state: Mutex<GateState>,
    runtime_handle: Option<runtime::Handle>,
}

impl Gate {
    fn new() -> Self {
        Gate {
            id: NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(GateState {
                lifecycle: Lifecycle::Active,
                teardown: None,
            }),
            runtime_handle: runtime::Handle::try_current().ok(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_active(&self) -> bool {
        self.lock().lifecycle == Lifecycle::Active
    }

    // Claims the terminal transition. Only the first caller gets `true`.
    fn begin_terminal(&self) -> bool {
        let mut state = self.lock();
        if state.lifecycle != Lifecycle::Active {
            return false;
        }
        state.lifecycle = Lifecycle::Terminating;
        true
    }

    fn close(&self, from: Lifecycle) -> bool {
        let teardown = {
            let mut state = self.lock();
            if state.lifecycle != from {
                return false;
            }
            state.lifecycle = Lifecycle::Closed;
            state.teardown.take()
        };
        if let Some(teardown) = teardown {
            self.run_teardown(teardown);
        }
        true
    }

    fn unsubscribe(&self) {
        if self.close(Lifecycle::Active) {
            trace!(subscription = self.id, "unsubscribed");
        }
    }

    fn set_teardown(&self, teardown: Teardown) {
        if teardown.is_nil() {
            return;
        }
        let run_now = {
            let mut state = self.lock();
            debug_assert!(state.teardown.is_none(), "teardown registered twice");
            if state.lifecycle == Lifecycle::Closed {
                Some(teardown)
            } else {
                state.teardown = Some(teardown);
                None
            }
        };
        // The stream already ended while the producer was still running.
        if let Some(teardown) = run_now {
            self.run_teardown(teardown);
        }
    }

    fn run_teardown(&self, teardown: Teardown) {
        debug!(subscription = self.id, ?teardown, "running teardown");
        teardown.run(self.id, self.runtime_handle.as_ref());
    }
}

/// The per-subscription observer handed to a producer.
///
/// A `Subscriber` wraps the consumer's [`Handlers`] and decides whether a signal
/// still reaches them. Once the subscription has ended, by `error`, `complete`
/// or `unsubscribe`, every further signal is silently ignored. None of its
/// methods ever fail or panic on misuse.
///
/// Producers that emit asynchronously should check [`is_unsubscribed`] before
/// doing expensive work for the next value.
///
/// [`is_unsubscribed`]: Subscriber::is_unsubscribed
pub struct Subscriber<T> {
    handlers: Handlers<T>,
    gate: Arc<Gate>,
}

impl<T> Subscriber<T> {
    pub(crate) fn new(handlers: Handlers<T>) -> Self {
        let gate = Arc::new(Gate::new());
        trace!(subscription = gate.id, ?handlers, "subscriber created");
        Subscriber { handlers, gate }
    }

    /// Returns `true` once the subscription has ended for any reason.
    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        !self.gate.is_active()
    }

    /// Ends the subscription without notifying the consumer.
    pub fn unsubscribe(&self) {
        self.gate.unsubscribe();
    }

    /// Returns a handle that cancels this subscription.
    #[must_use]
    pub fn subscription(&self) -> Subscription {
        Subscription {
            gate: Arc::clone(&self.gate),
        }
    }

    /// Signals `error` with any error type, wrapping it in an [`ErrorValue`].
    pub fn fail(&mut self, error: impl Error + Send + Sync + 'static) {
        self.error(Arc::new(error));
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if !self.gate.is_active() {
            return;
        }
        if let Some(nfn) = &mut self.handlers.next_fn {
            (nfn)(v);
        }
    }

    fn error(&mut self, observable_error: ErrorValue) {
        if !self.gate.begin_terminal() {
            return;
        }
        trace!(subscription = self.gate.id, error = %observable_error, "stream errored");
        if let Some(efn) = &mut self.handlers.error_fn {
            (efn)(observable_error);
        }
        self.gate.close(Lifecycle::Terminating);
    }

    fn complete(&mut self) {
        if !self.gate.begin_terminal() {
            return;
        }
        trace!(subscription = self.gate.id, "stream completed");
        if let Some(cfn) = &mut self.handlers.complete_fn {
            (cfn)();
        }
        self.gate.close(Lifecycle::Terminating);
    }
}

impl<T> fmt::Debug for Subscriber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.gate.id)
            .field("handlers", &self.handlers)
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}

/// Represents a subscription to an observable, allowing it to be cancelled.
///
/// Cloned handles all refer to the same subscription.
#[derive(Clone)]
pub struct Subscription {
    gate: Arc<Gate>,
}

impl Subscription {
    /// Process-unique id of this subscription, as it appears in log events.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.gate.id
    }

    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        !self.gate.is_active()
    }

    // Called once per subscription, strictly after the producer returned.
    pub(crate) fn set_teardown(&self, teardown: Teardown) {
        self.gate.set_teardown(teardown);
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(&self) {
        self.gate.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.gate.id)
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}
