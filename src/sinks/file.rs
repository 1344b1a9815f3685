//! File sink implementation

use std::sync::Arc;

use crate::core::encoder::EncoderSpec;
use crate::core::error::{LogError, Result};
use crate::core::gate::LevelGate;
use crate::core::record::LogRecord;
use crate::core::sink::{EmitStatus, Sink};

use super::rotate::RotateWriter;

/// Structured-output sink backed by a shared rotating destination.
///
/// Filtered solely by the shared gate; no stream split. Several facades may
/// hold sinks over the same [`RotateWriter`].
pub struct FileSink {
    spec: EncoderSpec,
    gate: LevelGate,
    writer: Arc<RotateWriter>,
}

impl FileSink {
    pub fn new(spec: EncoderSpec, gate: LevelGate, writer: Arc<RotateWriter>) -> Self {
        Self { spec, gate, writer }
    }
}

impl Sink for FileSink {
    fn emit(&self, record: &LogRecord) -> Result<EmitStatus> {
        if !self.gate.enabled(record.severity) {
            return Ok(EmitStatus::Dropped);
        }

        let mut line = self.spec.json_line(record)?;
        line.push_str(&self.spec.line_ending);

        self.writer
            .write_record(line.as_bytes())
            .map_err(|e| LogError::write(self.name(), e))?;
        Ok(EmitStatus::Written)
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| LogError::write(self.name(), e))
    }

    fn name(&self) -> &str {
        "file"
    }
}
