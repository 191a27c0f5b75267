//! Error values carried through the `error` signal of a subscription.
mod stream_errors;

pub use stream_errors::{ErrorValue, StreamError};
