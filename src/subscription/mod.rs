//! Provides structures and traits related to subscription management.
//!
//! This module includes `Handlers` for describing how emitted values, errors and
//! completion are consumed, `Subscriber` which guards those handlers for a single
//! subscription, and `Subscription` for cancelling it.
//!
//! Additionally, it defines the `Teardown` returned by producers and the traits
//! implemented by subscribable and cancellable types.
pub mod subscribe;
