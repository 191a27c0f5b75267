use std::error::Error;
use std::sync::Arc;

use thiserror::Error;

/// Opaque error value delivered to a subscriber's `error` handler.
///
/// Errors are shared behind an `Arc` so producers can hand the same value to
/// several subscriptions without requiring the error type to be `Clone`.
pub type ErrorValue = Arc<dyn Error + Send + Sync>;

/// A ready-made error type for producers that have nothing more specific
/// to report.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Plain message, displayed verbatim.
    #[error("{0}")]
    Message(String),

    /// Failure of a named stream caused by an underlying error.
    #[error("{name} stream emitted an error")]
    Source {
        name: &'static str,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StreamError {
    pub fn message(msg: impl Into<String>) -> Self {
        StreamError::Message(msg.into())
    }

    pub fn caused_by(name: &'static str, source: impl Error + Send + Sync + 'static) -> Self {
        StreamError::Source {
            name,
            source: Box::new(source),
        }
    }

    /// Wraps this error into an [`ErrorValue`] ready for `Observer::error`.
    #[must_use]
    pub fn into_value(self) -> ErrorValue {
        Arc::new(self)
    }
}
