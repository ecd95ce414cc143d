pub mod dispatcher;

pub use dispatcher::{Dispatcher, DrainStats};

/// Destination for records drained out of a ring.
pub trait RecordSink<T>: Send {
    /// Returns `false` when the sink could not accept the record.
    fn consume(&mut self, record: &T) -> bool;

    fn flush(&mut self) {}

    fn name(&self) -> &str;
}
