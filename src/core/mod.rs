//! Core pipeline types and traits

pub mod encoder;
pub mod error;
pub mod facade;
pub mod fields;
pub mod gate;
pub mod record;
pub mod severity;
pub mod sink;

pub use encoder::{CallerFormat, DurationFormat, EncoderSpec, LevelStyle, TimestampFormat};
pub use error::{LogError, Result};
pub use facade::{Backend, Logger};
pub use fields::{FieldSet, FieldValue};
pub use gate::LevelGate;
pub use record::{Caller, LogRecord};
pub use severity::Severity;
pub use sink::{EmitStatus, Sink};
