//! Shared mutable severity threshold

use parking_lot::RwLock;
use std::str::FromStr;
use std::sync::{Arc, Weak};

use super::error::{LogError, Result};
use super::severity::Severity;

/// Thread-safe severity threshold shared by every sink of one facade.
///
/// Many readers (one per `emit` admit decision) and an occasional writer
/// (`set_level` or a dynamic update) go through the same cell, so a single
/// update is visible to every sink's next filtering decision.
#[derive(Debug, Clone)]
pub struct LevelGate {
    level: Arc<RwLock<Severity>>,
}

impl LevelGate {
    pub fn new(initial: Severity) -> Self {
        Self {
            level: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn set(&self, severity: Severity) {
        *self.level.write() = severity;
    }

    pub fn get(&self) -> Severity {
        *self.level.read()
    }

    /// True iff a record at `severity` passes the current threshold.
    /// Boundary inclusive: the set value itself is enabled.
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= *self.level.read()
    }

    /// Parse a textual severity and apply it. On parse failure the current
    /// level is left unchanged.
    pub fn apply_text(&self, text: &str) -> Result<()> {
        let severity = Severity::from_str(text).map_err(|e| {
            LogError::watch_parse(text, e.to_string())
        })?;
        self.set(severity);
        Ok(())
    }

    /// Weak handle for observers that must not keep the facade alive.
    pub(crate) fn downgrade(&self) -> WeakGate {
        WeakGate {
            level: Arc::downgrade(&self.level),
        }
    }
}

/// Weak counterpart of [`LevelGate`], held by the level watcher thread.
#[derive(Debug, Clone)]
pub(crate) struct WeakGate {
    level: Weak<RwLock<Severity>>,
}

impl WeakGate {
    /// Upgrade back to a usable gate; `None` once every facade sharing the
    /// cell has been dropped.
    pub(crate) fn upgrade(&self) -> Option<LevelGate> {
        self.level.upgrade().map(|level| LevelGate { level })
    }
}
