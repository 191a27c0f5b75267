use crate::ErrorValue;

/// Receiving end of a stream.
///
/// Producers emit through this trait. `next` may be called any number of
/// times; `error` and `complete` are terminal and mutually exclusive, so at
/// most one of them takes effect per subscription.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn error(&mut self, _: ErrorValue);
    fn complete(&mut self);
}
