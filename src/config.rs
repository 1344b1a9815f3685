//! Pipeline configuration and assembly

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::encoder::EncoderSpec;
use crate::core::error::Result;
use crate::core::facade::Logger;
use crate::core::gate::LevelGate;
use crate::core::severity::Severity;
use crate::core::sink::Sink;
use crate::sinks::console::ConsoleSink;
use crate::sinks::file::FileSink;
use crate::sinks::rotate::{self, FileRotateConfig};
use crate::watch::{self, LevelUpdate};

/// Console channel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enable: bool,
    /// Encoder override; unset means the console defaults
    pub encoder: Option<EncoderSpec>,
}

/// File channel configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enable: bool,
    #[serde(flatten)]
    pub rotate: FileRotateConfig,
    /// Encoder override; unset means the file defaults
    pub encoder: Option<EncoderSpec>,
}

fn default_level() -> String {
    "debug".to_string()
}

/// Declarative configuration for one logging pipeline.
///
/// Scanned from the host's configuration store; not mutated after the
/// pipeline is built. Only the severity is live-mutable afterwards,
/// through the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Starting severity name, e.g. "debug" or "warn"
    pub level: String,
    /// Capture the call site on every record
    pub add_caller: bool,
    /// Leading stack frames to drop when rendering a fault backtrace
    pub caller_skip: usize,
    pub file: FileConfig,
    pub console: ConsoleConfig,
    /// Subscribe to dynamic level updates when a feed is supplied
    pub watch_lv: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            add_caller: false,
            caller_skip: 0,
            file: FileConfig::default(),
            console: ConsoleConfig::default(),
            watch_lv: false,
        }
    }
}

impl PipelineConfig {
    /// Build the configured pipeline.
    ///
    /// Fails fast on an unparseable starting severity.
    pub fn build(&self) -> Result<Logger> {
        let initial: Severity = self.level.parse()?;
        self.assemble(LevelGate::new(initial))
    }

    /// Build and, when `watch_lv` is set, subscribe the pipeline's gate to
    /// a feed of configuration change events.
    pub fn build_with_feed(&self, feed: Receiver<LevelUpdate>) -> Result<Logger> {
        let logger = self.build()?;
        if self.watch_lv {
            watch::spawn_watcher(logger.gate(), feed);
        }
        Ok(logger)
    }

    /// Construct the sink fanout around an existing gate.
    ///
    /// Shared by `build` and `Logger::clone_with_level`; the file
    /// destination resolves through the process-wide registry, so every
    /// assembly over the same path shares one live handle.
    pub(crate) fn assemble(&self, gate: LevelGate) -> Result<Logger> {
        let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();

        if self.console.enable {
            let spec = self
                .console
                .encoder
                .clone()
                .unwrap_or_else(EncoderSpec::console_default);
            sinks.push(Arc::new(ConsoleSink::stderr(spec.clone(), gate.clone())));
            sinks.push(Arc::new(ConsoleSink::stdout(spec, gate.clone())));
        }

        if self.file.enable {
            let spec = self
                .file
                .encoder
                .clone()
                .unwrap_or_else(EncoderSpec::file_default);
            let writer = rotate::shared(&self.file.rotate)?;
            sinks.push(Arc::new(FileSink::new(spec, gate.clone(), writer)));
        }

        Ok(Logger::from_parts(sinks, gate, self))
    }
}
