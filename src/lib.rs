//! `rxcore` is a minimal push-based stream primitive.
//!
//! An [`Observable`] wraps a producer function. Each call to `subscribe` runs the
//! producer against a fresh [`Subscriber`](subscribe::Subscriber), which delivers
//! values, an error or a completion signal to the consumer's
//! [`Handlers`](subscribe::Handlers) until the subscription ends. The returned
//! [`Subscription`](subscribe::Subscription) cancels it at any time.
//!
//! A subscription ends exactly once, on the first of `error`, `complete` or
//! `unsubscribe`. After that every signal is ignored and the producer's
//! [`Teardown`](subscribe::Teardown) has run. Misuse such as signalling after
//! completion or unsubscribing twice is absorbed silently, never reported.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use rxcore::subscribe::Handlers;
//! use rxcore::{Observable, Subscribeable};
//!
//! let collected = Arc::new(Mutex::new(Vec::new()));
//! let collected_c = Arc::clone(&collected);
//! let done = Arc::new(Mutex::new(false));
//! let done_c = Arc::clone(&done);
//!
//! Observable::from([1, 2, 3]).subscribe(
//!     Handlers::new()
//!         .on_next(move |v| collected_c.lock().unwrap().push(v))
//!         .on_complete(move || *done_c.lock().unwrap() = true),
//! );
//!
//! assert_eq!(*collected.lock().unwrap(), vec![1, 2, 3]);
//! assert!(*done.lock().unwrap());
//! ```

mod errors;
pub mod observable;
pub mod observer;
pub mod subscription;

pub use errors::{ErrorValue, StreamError};
pub use observable::Observable;
pub use observer::Observer;
pub use subscription::subscribe;
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};
