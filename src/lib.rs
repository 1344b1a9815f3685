//! # fanlog
//!
//! A structured-logging core that turns a declarative configuration into a
//! live pipeline: one level gate shared by every sink, a console pair that
//! splits actionable records onto the error stream, and a size-rotated
//! file destination with bounded archive retention.
//!
//! ## Features
//!
//! - **Severity gating**: one mutable threshold, visible to every sink
//! - **Fanout**: each sink encodes and filters independently; one failing
//!   sink never blocks the others
//! - **Rotation**: size-triggered rollover with age and count pruning,
//!   optional gzip archives, one shared handle per path
//! - **Dynamic level**: subscribe the gate to an external config watcher

pub mod config;
pub mod core;
pub mod macros;
pub mod sinks;
pub mod watch;

pub mod prelude {
    pub use crate::config::{ConsoleConfig, FileConfig, PipelineConfig};
    pub use crate::core::{
        Backend, Caller, CallerFormat, DurationFormat, EmitStatus, EncoderSpec, FieldSet,
        FieldValue, LevelGate, LevelStyle, LogError, Logger, LogRecord, Result, Severity, Sink,
        TimestampFormat,
    };
    pub use crate::sinks::{ConsoleRoute, ConsoleSink, FileRotateConfig, FileSink, RotateWriter};
    pub use crate::watch::{LevelUpdate, LEVEL_KEY};
}

pub use crate::config::{ConsoleConfig, FileConfig, PipelineConfig};
pub use crate::core::{
    Backend, Caller, CallerFormat, DurationFormat, EmitStatus, EncoderSpec, FieldSet, FieldValue,
    LevelGate, LevelStyle, LogError, Logger, LogRecord, Result, Severity, Sink, TimestampFormat,
};
pub use crate::sinks::{ConsoleRoute, ConsoleSink, FileRotateConfig, FileSink, RotateWriter};
pub use crate::watch::{LevelUpdate, LEVEL_KEY};
