//! The `observable` module provides `Observable`, a cold stream of values that
//! runs its producer once per subscription.

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::subscription::subscribe::{
    Handlers, Subscribeable, Subscriber, Subscription, Teardown,
};
use crate::{observer::Observer, ErrorValue};


type SubscribeFn<T> = dyn Fn(Subscriber<T>) -> Teardown + Send + Sync;

/// The `Observable` struct represents a source of values that can be observed.
///
/// An `Observable` is only a template: it wraps a producer function and holds no
/// subscription state of its own. Every call to `subscribe` creates a fresh
/// [`Subscriber`], runs the producer with it and returns a [`Subscription`] for
/// that run alone.
///
/// # Example: basic synchronous `Observable`
///
/// This `Observable` emits values and completes before `subscribe` returns. It
/// needs no cleanup so it returns `Teardown::Nil`.
///
/// ```
/// use rxcore::subscribe::{Handlers, Teardown};
/// use rxcore::{Observable, Observer, Subscribeable};
///
/// // Create a custom observable that emits values from 1 to 10.
/// let emit_10_observable = Observable::new(|mut subscriber| {
///     for i in 1..=10 {
///         // Emit the value to the subscriber.
///         subscriber.next(i);
///     }
///     // Signal completion to the subscriber.
///     subscriber.complete();
///
///     Teardown::Nil
/// });
///
/// // Every handler is optional.
/// let handlers = Handlers::new()
///     .on_next(|v| println!("Emitted {}", v))
///     .on_complete(|| println!("Completed"));
///
/// // Observables are cold. Nothing is emitted until they are subscribed to.
/// emit_10_observable.subscribe(handlers);
/// ```
///
/// # Example: asynchronous `Observable` with `unsubscribe`
///
/// The producer moves its `Subscriber` to an OS thread and keeps emitting after
/// `subscribe` has returned. It checks `is_unsubscribed` before each emission so
/// it stops doing work once the consumer cancels. Values emitted after
/// cancellation would be dropped anyway.
///
/// ```no_run
/// use std::time::Duration;
///
/// use rxcore::subscribe::{Handlers, Teardown, Unsubscribeable};
/// use rxcore::{Observable, Observer, Subscribeable};
///
/// let observable = Observable::new(|mut o| {
///     std::thread::spawn(move || {
///         for i in 0..=10000 {
///             if o.is_unsubscribed() {
///                 break;
///             }
///             o.next(i);
///             std::thread::sleep(Duration::from_millis(1));
///         }
///         o.complete();
///     });
///
///     Teardown::logic(|| println!("Producer released"))
/// });
///
/// let subscription = observable.subscribe(Handlers::new().on_next(|v| println!("Emitted {}", v)));
///
/// std::thread::sleep(Duration::from_millis(50));
///
/// // Stop emissions. Calling it again does nothing.
/// subscription.unsubscribe();
/// subscription.unsubscribe();
/// ```
///
/// # Example: `Observable` with error handling
///
/// Errors are data routed to the `error` handler. After `error` the subscription
/// has ended: the `complete` call below has no effect.
///
/// ```
/// use rxcore::subscribe::{Handlers, Teardown};
/// use rxcore::{Observable, Observer, StreamError, Subscribeable};
///
/// pub fn parse_numbers(input: &'static [&'static str]) -> Observable<i32> {
///     Observable::new(move |mut observer| {
///         for raw in input {
///             match raw.parse::<i32>() {
///                 Ok(num) => observer.next(num),
///                 Err(e) => {
///                     observer.fail(StreamError::caused_by("numbers", e));
///                     break;
///                 }
///             }
///         }
///         observer.complete();
///         Teardown::Nil
///     })
/// }
///
/// parse_numbers(&["1", "two", "3"]).subscribe(
///     Handlers::new()
///         .on_next(|n| println!("Parsed {}", n))
///         .on_error(|e| eprintln!("{}", e))
///         .on_complete(|| println!("never printed")),
/// );
/// ```
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T: 'static> Observable<T> {
    /// Creates a new `Observable` with the provided producer function.
    ///
    /// The producer `sf` is invoked synchronously on every `subscribe`, with the
    /// `Subscriber` of that subscription. It may emit right away or keep the
    /// `Subscriber` and emit later from another thread or task. The returned
    /// [`Teardown`] is registered after `sf` returns and runs once when the
    /// subscription ends; if the subscription already ended while `sf` was
    /// running, the teardown runs immediately.
    pub fn new(sf: impl Fn(Subscriber<T>) -> Teardown + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Arc::new(sf),
        }
    }

    /// Creates an `Observable` that completes without emitting any values.
    #[must_use]
    pub fn empty() -> Self {
        Observable::new(|mut o| {
            o.complete();
            Teardown::Nil
        })
    }

    /// Creates an `Observable` that signals `error` immediately on every
    /// subscription.
    #[must_use]
    pub fn failed(error: ErrorValue) -> Self {
        Observable::new(move |mut o| {
            o.error(Arc::clone(&error));
            Teardown::Nil
        })
    }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Creates an `Observable` that emits every item of `values` in order and
    /// then completes.
    ///
    /// The items are collected once and cloned for each subscription. All of
    /// them are delivered before `subscribe` returns, so unsubscribing from the
    /// returned `Subscription` has no effect on values already emitted.
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    ///
    /// use rxcore::subscribe::Handlers;
    /// use rxcore::{Observable, Subscribeable};
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let seen_c = Arc::clone(&seen);
    ///
    /// Observable::from(["a", "b", "c"]).subscribe(Handlers::new().on_next(move |v| {
    ///     seen_c.lock().unwrap().push(v);
    /// }));
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from(values: impl IntoIterator<Item = T>) -> Self {
        let values: Arc<[T]> = values.into_iter().collect();

        Observable::new(move |mut o| {
            let id = o.subscription().id();
            for v in values.iter() {
                o.next(v.clone());
            }
            o.complete();

            let len = values.len();
            Teardown::logic(move || {
                debug!(subscription = id, values = len, "end of stream");
            })
        })
    }
}

impl<T: Clone + Send + Sync + 'static> FromIterator<T> for Observable<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Observable::from(iter)
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&self, handlers: Handlers<Self::ObsType>) -> Subscription {
        let subscriber = Subscriber::new(handlers);
        let subscription = subscriber.subscription();

        let teardown = (self.subscribe_fn)(subscriber);
        subscription.set_teardown(teardown);

        subscription
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Observable {
            subscribe_fn: Arc::clone(&self.subscribe_fn),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}
