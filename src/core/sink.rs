//! Sink trait for log record destinations

use super::{error::Result, record::LogRecord};

/// Outcome of offering a record to a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitStatus {
    /// The record passed the sink's admit rule and was written
    Written,
    /// The record failed the admit rule; not written, not an error
    Dropped,
}

/// A single (encoder, destination, admit-rule) triple.
///
/// `emit` is called concurrently from many threads; implementations
/// serialize internally so no record is split mid-write.
pub trait Sink: Send + Sync {
    fn emit(&self, record: &LogRecord) -> Result<EmitStatus>;
    fn flush(&self) -> Result<()>;
    fn name(&self) -> &str;
}
