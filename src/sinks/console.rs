//! Console sink pair implementation
//!
//! Console output is split by severity: records at or above `Error` go to
//! the error stream, everything below goes to standard output. An operator
//! tailing only stderr sees exactly the actionable subset.

use parking_lot::Mutex;
use std::io::{self, Write};

use crate::core::encoder::EncoderSpec;
use crate::core::error::{LogError, Result};
use crate::core::gate::LevelGate;
use crate::core::record::LogRecord;
use crate::core::severity::Severity;
use crate::core::sink::{EmitStatus, Sink};

/// Which half of the console pair a sink serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleRoute {
    /// Records below `Error`
    Stdout,
    /// Records at or above `Error`
    Stderr,
}

/// One half of the console pair: an encoder, a stream and the shared gate.
pub struct ConsoleSink {
    route: ConsoleRoute,
    spec: EncoderSpec,
    gate: LevelGate,
    // The OS stream serializes on its own, but locking here guarantees a
    // record is never split even for non-stream writers.
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Sink for the standard-output half of the pair.
    pub fn stdout(spec: EncoderSpec, gate: LevelGate) -> Self {
        Self::with_writer(ConsoleRoute::Stdout, spec, gate, Box::new(io::stdout()))
    }

    /// Sink for the error-stream half of the pair.
    pub fn stderr(spec: EncoderSpec, gate: LevelGate) -> Self {
        Self::with_writer(ConsoleRoute::Stderr, spec, gate, Box::new(io::stderr()))
    }

    /// Sink writing to an arbitrary destination, used by tests to observe
    /// routing decisions.
    pub fn with_writer(
        route: ConsoleRoute,
        spec: EncoderSpec,
        gate: LevelGate,
        writer: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            route,
            spec,
            gate,
            writer: Mutex::new(writer),
        }
    }

    fn admits(&self, severity: Severity) -> bool {
        if !self.gate.enabled(severity) {
            return false;
        }
        match self.route {
            ConsoleRoute::Stdout => severity < Severity::Error,
            ConsoleRoute::Stderr => severity >= Severity::Error,
        }
    }
}

impl Sink for ConsoleSink {
    fn emit(&self, record: &LogRecord) -> Result<EmitStatus> {
        if !self.admits(record.severity) {
            return Ok(EmitStatus::Dropped);
        }

        let mut line = self.spec.console_line(record);
        line.push_str(&self.spec.line_ending);

        let mut writer = self.writer.lock();
        writer
            .write_all(line.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| LogError::write(self.name(), e))?;
        Ok(EmitStatus::Written)
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LogError::write(self.name(), e))
    }

    fn name(&self) -> &str {
        match self.route {
            ConsoleRoute::Stdout => "console:stdout",
            ConsoleRoute::Stderr => "console:stderr",
        }
    }
}
