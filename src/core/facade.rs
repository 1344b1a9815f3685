//! Logger facade: the object applications log through

use std::backtrace::Backtrace;
use std::panic::Location;
use std::sync::Arc;

use crate::config::PipelineConfig;

use super::error::Result;
use super::fields::FieldSet;
use super::gate::LevelGate;
use super::record::{Caller, LogRecord};
use super::severity::Severity;
use super::sink::Sink;

/// Bound collection of sinks sharing one level gate.
///
/// Every `log` call is synchronously delivered to each admitting sink
/// before returning; there is no buffering across calls, so nothing is
/// lost when a `Fault` terminates the process right after delivery.
pub struct Logger {
    sinks: Vec<Arc<dyn Sink>>,
    gate: LevelGate,
    add_caller: bool,
    caller_skip: usize,
    // Retained so clones can rebuild sinks over the same destinations
    config: PipelineConfig,
}

impl Logger {
    pub(crate) fn from_parts(
        sinks: Vec<Arc<dyn Sink>>,
        gate: LevelGate,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            sinks,
            gate: gate.clone(),
            add_caller: config.add_caller,
            caller_skip: config.caller_skip,
            config: config.clone(),
        }
    }

    /// Emit one record to every admitting sink.
    ///
    /// A failing sink never blocks delivery to the others; the first write
    /// error is returned non-fatally. A `Fault` record terminates the
    /// process after delivery and a final flush of every sink.
    #[track_caller]
    pub fn log(
        &self,
        severity: Severity,
        message: impl Into<String>,
        fields: FieldSet,
    ) -> Result<()> {
        if !self.gate.enabled(severity) {
            return Ok(());
        }

        let mut record = LogRecord::new(severity, message.into()).with_fields(fields);
        if self.add_caller {
            let location = Location::caller();
            record = record.with_caller(Caller::new(location.file(), location.line()));
        }
        if severity == Severity::Fault {
            record = record.with_stack(capture_stack(self.caller_skip));
        }

        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.emit(&record) {
                if first_err.is_none() {
                    first_err = Some(e);
                } else {
                    eprintln!("[fanlog] {}", e);
                }
            }
        }

        if severity == Severity::Fault {
            for sink in &self.sinks {
                let _ = sink.flush();
            }
            std::process::exit(1);
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Debug, message, FieldSet::new())
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Info, message, FieldSet::new())
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Warn, message, FieldSet::new())
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(Severity::Error, message, FieldSet::new())
    }

    /// Record a fault and terminate the process. Never returns.
    #[track_caller]
    pub fn fault(&self, message: impl Into<String>) -> ! {
        let _ = self.log(Severity::Fault, message, FieldSet::new());
        // log() exits for Fault; this is unreachable but satisfies the type
        std::process::exit(1);
    }

    pub fn set_level(&self, severity: Severity) {
        self.gate.set(severity);
    }

    pub fn level(&self) -> Severity {
        self.gate.get()
    }

    pub fn enabled(&self, severity: Severity) -> bool {
        self.gate.enabled(severity)
    }

    pub fn flush(&self) -> Result<()> {
        for sink in &self.sinks {
            sink.flush()?;
        }
        Ok(())
    }

    /// New facade over the same destinations with an independent gate
    /// seeded from the current level. Later level changes on either facade
    /// do not affect the other.
    pub fn clone_with_level(&self) -> Result<Logger> {
        let gate = LevelGate::new(self.gate.get());
        self.config.assemble(gate)
    }

    pub(crate) fn gate(&self) -> &LevelGate {
        &self.gate
    }

    #[cfg(test)]
    pub(crate) fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

/// Contract consumed by a host's logger-selection mechanism.
///
/// Implemented by [`Logger`] so the pipeline can be installed as the
/// process-wide logger behind a named identifier; registration itself is
/// the host's concern.
pub trait Backend: Send + Sync {
    fn write(&self, severity: Severity, message: &str, fields: FieldSet) -> Result<()>;
    fn set_level(&self, severity: Severity);
    fn level(&self) -> Severity;
    fn enabled(&self, severity: Severity) -> bool;
    fn clone_boxed(&self) -> Result<Box<dyn Backend>>;
}

impl Backend for Logger {
    #[track_caller]
    fn write(&self, severity: Severity, message: &str, fields: FieldSet) -> Result<()> {
        self.log(severity, message, fields)
    }

    fn set_level(&self, severity: Severity) {
        Logger::set_level(self, severity);
    }

    fn level(&self) -> Severity {
        Logger::level(self)
    }

    fn enabled(&self, severity: Severity) -> bool {
        Logger::enabled(self, severity)
    }

    fn clone_boxed(&self) -> Result<Box<dyn Backend>> {
        Ok(Box::new(self.clone_with_level()?))
    }
}

/// Render the current backtrace, dropping capture frames plus `skip`
/// additional leading frames so the trace starts at the true call site.
fn capture_stack(skip: usize) -> String {
    trim_stack(&Backtrace::force_capture().to_string(), skip)
}

/// Drop the first `skip` frames from a rendered backtrace.
///
/// Frames are the blocks starting at `  N: symbol` lines; anything before
/// the first frame header is kept as-is.
fn trim_stack(rendered: &str, skip: usize) -> String {
    if skip == 0 {
        return rendered.to_string();
    }

    let is_frame_header = |line: &str| {
        let trimmed = line.trim_start();
        trimmed
            .split_once(':')
            .map(|(index, _)| !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    };

    let mut kept = Vec::new();
    let mut seen_frames = 0usize;
    for line in rendered.lines() {
        if is_frame_header(line) {
            seen_frames += 1;
        }
        if seen_frames > skip || seen_frames == 0 {
            kept.push(line);
        }
    }
    kept.join("\n")
}
